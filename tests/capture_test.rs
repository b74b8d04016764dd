//! Mounts a real viewer and exercises the capture contract end to end.
//! Needs a GPU and a windowing host, so everything is gated behind the
//! `integration-tests` feature.

#[cfg(feature = "integration-tests")]
use std::{thread, time::Duration};

#[cfg(feature = "integration-tests")]
use showroom_ngin::{run_with, StyleConfig, VehicleIdentity};

#[test]
#[cfg(feature = "integration-tests")]
fn capture_is_absent_until_a_frame_is_presented() {
    let identity = VehicleIdentity {
        make: "Aurora".to_string(),
        model: "GT".to_string(),
        year: 2024,
    };

    run_with(identity, StyleConfig::default(), |handle| {
        thread::spawn(move || {
            // Queued before the loop starts, so it is answered before the
            // first redraw: nothing has been presented yet.
            let early = handle
                .capture()
                .expect("viewer closed before answering the first capture");
            assert!(early.is_none(), "capture before any presented frame");

            let frame = loop {
                thread::sleep(Duration::from_millis(100));
                match handle.capture().expect("viewer closed while rendering") {
                    Some(frame) => break frame,
                    None => continue,
                }
            };

            let decoded =
                image::load_from_memory(&frame.png).expect("captured bytes decode as an image");
            assert_eq!(decoded.width(), frame.width);
            assert_eq!(decoded.height(), frame.height);
            assert_eq!(frame.identity.make, "Aurora");
            assert_eq!(frame.identity.year, 2024);

            handle.close().expect("viewer closed before the shutdown request");
        });
    })
    .expect("viewer run failed");
}
