mod common;

use common::synthetic_display::display_frame;
use image::Rgb;
use segment_reader::{BatchDecoder, DecoderConfig, DisplayDecoder, Reading, ThresholdBounds};

fn red_bounds() -> ThresholdBounds {
    ThresholdBounds::from_values([0, 100, 100, 10, 255, 255])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_readings_keep_frame_order() {
    let texts = ["123456", " 01234", "-05123", "12?456", "999999", "-00001"];
    let frames = texts
        .iter()
        .map(|text| display_frame(text, Rgb([255, 0, 0])))
        .collect::<Vec<_>>();

    let batch = BatchDecoder::new(DecoderConfig::default(), Some(3)).expect("valid config");
    let analyses = batch.decode_all(frames.clone(), red_bounds()).await.expect("pool alive");

    let readings: Vec<String> = analyses.iter().map(|a| a.reading.to_string()).collect();
    assert_eq!(
        readings,
        vec!["12.3456", "0.1234", "-0.5123", "unreadable", "99.9999", "-0.0001"]
    );

    let single = DisplayDecoder::new(DecoderConfig::default()).unwrap();
    for (frame, analysis) in frames.iter().zip(&analyses) {
        assert_eq!(single.decode(frame, &red_bounds()).reading, analysis.reading);
    }

    batch.shutdown().await;
}

#[tokio::test]
async fn concurrent_single_requests_are_answered_individually() {
    let batch = BatchDecoder::new(DecoderConfig::default(), Some(2)).unwrap();

    let (a, b) = tokio::join!(
        batch.decode(display_frame("000001", Rgb([255, 0, 0])), red_bounds()),
        batch.decode(display_frame("-10000", Rgb([255, 0, 0])), red_bounds()),
    );

    assert_eq!(a.unwrap().reading, Reading::Value(0.0001));
    assert_eq!(b.unwrap().reading, Reading::Value(-1.0));
    batch.shutdown().await;
}
