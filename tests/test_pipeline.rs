
use std::thread;
use image::{Rgb, RgbImage};
use y8_detect::common::{ChannelOrder, SourceImage};
use y8_detect::data::{ConfigOrt, NmsMode, X};
use y8_detect::detection_runners::{InferenceGateway, InferenceProcess, SharedGateway, Thresholds, Y8Detector};
use y8_detect::DetectError;
use synthetic::{raw_output, FixedGateway, Raw, INPUT_H, INPUT_W};

const NC: usize = 2;

fn two_boxes() -> ndarray::Array3<f32> {
    raw_output(
        &[
            Raw::corner(64., 48., 128., 96., 0, 0.9, NC),
            Raw::corner(320., 240., 64., 48., 1, 0.6, NC),
        ],
        NC,
    )
}

fn frame(w: u32, h: u32) -> SourceImage {
    SourceImage::from(RgbImage::from_pixel(w, h, Rgb([30, 60, 90])))
}

#[test]
fn predict_runs_all_stages() {
    let config = ConfigOrt::new().with_names(&["person", "bicycle"]);
    let mut detector = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap();

    let set = detector.predict(&frame(1920, 1080), 0.4, 0.4).unwrap();

    assert_eq!(detector.gateway().calls, 1);
    assert_eq!(
        detector.gateway().last_input_shape,
        vec![1, 3, INPUT_H as usize, INPUT_W as usize]
    );
    assert_eq!(set.len(), 2);

    let person = &set.get(0).unwrap()[0];
    assert_eq!(detector.label(person.class_id), "person");
    assert_eq!(detector.label(7), "# 7");

    // fractions map onto any source resolution
    let on_source = person.bbox_in(1920, 1080);
    assert!((on_source.left - 192.).abs() < 1e-3);
    assert!((on_source.top - 108.).abs() < 1e-3);
    assert!((on_source.width - 384.).abs() < 1e-3);
    assert!((on_source.height - 216.).abs() < 1e-3);
}

#[test]
fn predict_default_uses_configured_thresholds() {
    let config = ConfigOrt::new().with_conf(0.7);
    let mut detector = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap();
    assert_eq!(detector.thresholds(), Thresholds::new(0.7, 0.4));

    let set = detector.predict_default(&frame(32, 32)).unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains_class(0));
}

#[test]
fn run_matches_predict() {
    let config = ConfigOrt::new();
    let mut detector = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap();
    let img = frame(100, 50);

    let a = detector.run(&img, Thresholds::new(0.4, 0.4)).unwrap();
    let b = detector.predict(&img, 0.4, 0.4).unwrap();
    assert_eq!(a, b);
}

#[test]
fn bgr_frames_go_through() {
    let config = ConfigOrt::new().with_channel_order(ChannelOrder::Bgr);
    let mut detector = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap();
    let set = detector
        .predict_rgb8(RgbImage::from_pixel(64, 64, Rgb([255, 0, 0])), 0.4, 0.4)
        .unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn names_fall_back_to_model_metadata() {
    let gateway = FixedGateway::new(two_boxes()).with_names(&["cat", "dog"]);
    let detector = Y8Detector::new(gateway, &ConfigOrt::new()).unwrap();
    assert_eq!(detector.names(), &["cat".to_string(), "dog".to_string()]);
    assert_eq!(detector.label(1), "dog");
}

#[test]
fn empty_image_is_invalid_input() {
    let mut detector = Y8Detector::new(FixedGateway::new(two_boxes()), &ConfigOrt::new()).unwrap();
    let err = detector.predict(&frame(0, 0), 0.4, 0.4).unwrap_err();
    assert!(matches!(err, DetectError::InvalidInput { width: 0, height: 0 }));
    assert_eq!(detector.gateway().calls, 0);
}

#[test]
fn wrong_output_count_is_shape_mismatch() {
    let raw = X::from(two_boxes().into_dyn());
    let gateway = FixedGateway::new(two_boxes()).with_outputs(vec![raw.clone(), raw]);
    let mut detector = Y8Detector::new(gateway, &ConfigOrt::new()).unwrap();
    let err = detector.predict(&frame(8, 8), 0.4, 0.4).unwrap_err();
    assert!(matches!(err, DetectError::ShapeMismatch { .. }));

    let gateway = FixedGateway::new(two_boxes()).with_outputs(vec![]);
    let mut detector = Y8Detector::new(gateway, &ConfigOrt::new()).unwrap();
    let err = detector.predict(&frame(8, 8), 0.4, 0.4).unwrap_err();
    assert!(matches!(err, DetectError::ShapeMismatch { .. }));
}

#[test]
fn wrong_rank_is_shape_mismatch() {
    let flat = X::from(vec![0.0f32; 12]);
    let gateway = FixedGateway::new(two_boxes()).with_outputs(vec![flat]);
    let mut detector = Y8Detector::new(gateway, &ConfigOrt::new()).unwrap();
    let err = detector.predict(&frame(8, 8), 0.4, 0.4).unwrap_err();
    assert!(matches!(err, DetectError::ShapeMismatch { .. }));
}

#[test]
fn configured_class_count_must_match_model() {
    let config = ConfigOrt::new().with_nc(80);
    let err = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap_err();
    assert!(matches!(err, DetectError::ShapeMismatch { .. }));

    let config = ConfigOrt::new().with_nc(NC);
    let detector = Y8Detector::new(FixedGateway::new(two_boxes()), &config).unwrap();
    assert_eq!(detector.decoder().nc(), Some(NC));
}

#[test]
fn per_class_nms_from_config() {
    let raw = raw_output(
        &[
            Raw::corner(10., 10., 100., 100., 0, 0.9, NC),
            Raw::corner(15., 15., 100., 100., 1, 0.8, NC),
        ],
        NC,
    );
    let mut agnostic = Y8Detector::new(FixedGateway::new(raw.clone()), &ConfigOrt::new()).unwrap();
    assert_eq!(agnostic.predict(&frame(8, 8), 0.4, 0.4).unwrap().len(), 1);

    let config = ConfigOrt::new().with_nms_mode(NmsMode::PerClass);
    let mut per_class = Y8Detector::new(FixedGateway::new(raw), &config).unwrap();
    assert_eq!(per_class.predict(&frame(8, 8), 0.4, 0.4).unwrap().len(), 2);
}

#[test]
fn shared_gateway_serializes_calls() {
    let shared = SharedGateway::new(FixedGateway::new(two_boxes()));
    assert_eq!(shared.io_spec().input_width(), INPUT_W);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gateway = shared.clone();
            thread::spawn(move || {
                let mut detector = Y8Detector::new(gateway, &ConfigOrt::new()).unwrap();
                for _ in 0..5 {
                    let set = detector.predict(&frame(40, 30), 0.4, 0.4).unwrap();
                    assert_eq!(set.len(), 2);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(shared.with_inner(|g| g.calls), 20);
}
