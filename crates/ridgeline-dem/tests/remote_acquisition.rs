//! Remote acquisition against a scripted HTTP server on localhost.

use ridgeline_dem::{acquire, grid_coordinates, ElevationGrid, GridArea, Provider, RateLimit, RemoteSource};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use std::time::Duration;

/// Serve one canned response per connection, in order, and return the
/// request lines that were received.
fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            seen.push(request_line.trim_end().to_string());

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        seen
    });

    (base, handle)
}

fn open_elevation_body(elevation: f64) -> String {
    format!(r#"{{"results":[{{"latitude":0,"longitude":0,"elevation":{}}}]}}"#, elevation)
}

fn no_delay(batch_size: usize) -> RateLimit {
    RateLimit {
        batch_size,
        delay: Duration::ZERO,
    }
}

#[test]
fn test_http_500_yields_single_null_in_order() {
    let responses = vec![
        (200, open_elevation_body(900.0)),
        (200, open_elevation_body(910.0)),
        (500, r#"{"error":"internal"}"#.to_string()),
        (200, open_elevation_body(930.0)),
        (200, open_elevation_body(940.0)),
    ];
    let (base, server) = serve(responses);

    let source = RemoteSource::new(Provider::OpenElevation, Some(format!("{}/api/v1/lookup", base)), None).unwrap();
    let coords: Vec<(f64, f64)> = (0..5).map(|i| (-25.0 - i as f64 * 0.01, -50.0)).collect();

    let samples = acquire(&source, &coords, &no_delay(2)).unwrap();
    let requests = server.join().unwrap();

    assert_eq!(samples.len(), 5);
    assert_eq!(samples.iter().filter(|s| s.elevation.is_none()).count(), 1);
    assert_eq!(samples[2].elevation, None);
    assert_eq!(samples[0].elevation, Some(900.0));
    assert_eq!(samples[4].elevation, Some(940.0));
    for (sample, &(lat, lon)) in samples.iter().zip(&coords) {
        assert_eq!((sample.lat, sample.lon), (lat, lon));
    }

    assert_eq!(requests.len(), 5);
    assert!(requests[0].starts_with("GET /api/v1/lookup?locations=-25"));
}

#[test]
fn test_mapbox_request_shape_and_no_data() {
    let responses = vec![
        (200, r#"{"type":"FeatureCollection","features":[{"properties":{"ele":1100}}]}"#.to_string()),
        (200, r#"{"type":"FeatureCollection","features":[]}"#.to_string()),
        (200, "not json".to_string()),
    ];
    let (base, server) = serve(responses);

    let source = RemoteSource::new(
        Provider::Mapbox,
        Some(format!("{}/v4/mapbox.mapbox-terrain-v2/tilequery", base)),
        Some("secret".to_string()),
    )
    .unwrap();
    let coords = [(-25.1, -50.9), (-25.2, -50.8), (-25.3, -50.7)];

    let samples = acquire(&source, &coords, &no_delay(100)).unwrap();
    let requests = server.join().unwrap();

    let elevations: Vec<Option<f64>> = samples.iter().map(|s| s.elevation).collect();
    assert_eq!(elevations, vec![Some(1100.0), None, None]);

    let first = &requests[0];
    assert!(first.starts_with("GET /v4/mapbox.mapbox-terrain-v2/tilequery/-50.9,-25.1.json?"));
    assert!(first.contains("layers=contour"));
    assert!(first.contains("access_token=secret"));
}

#[test]
fn test_acquired_grid_reshapes_when_complete() {
    let area = GridArea {
        center_lat: 0.0,
        center_lon: 0.0,
        grid_size: 2,
        extent: 0.01,
    };
    let coords = grid_coordinates(&area).unwrap();
    let responses = (0..4).map(|i| (200, open_elevation_body(100.0 + i as f64))).collect();
    let (base, server) = serve(responses);

    let source = RemoteSource::new(Provider::OpenElevation, Some(base), None).unwrap();
    let samples = acquire(&source, &coords, &no_delay(1)).unwrap();
    server.join().unwrap();

    let grid = ElevationGrid::from_samples(&samples, area.grid_size).unwrap();
    assert_eq!(grid.elevation_matrix(), vec![vec![100.0, 101.0], vec![102.0, 103.0]]);
}
