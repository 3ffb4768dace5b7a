//! End-to-end tests of the `climb:climbalongline` algorithm through the
//! provider: embedded Z, draped DEM, cancellation, field collisions and
//! GeoJSON output.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use climb_algorithms::climb_provider;
use climb_algorithms::vector::climb::{
    accumulate_climb, ClimbAlongLine, BAND, DEM, INPUT, MAX_ELEVATION, MIN_ELEVATION, OUTPUT,
    TOTAL_CLIMB, TOTAL_DESCENT,
};
use climb_algorithms::vector::drape::Drape;
use climb_core::io::{read_geojson, read_geojson_from_str};
use climb_core::processing::{
    Feedback, LogLevel, OutputValue, ParamValue, Parameters, ProcessingAlgorithm,
};
use climb_core::raster::{GeoTransform, Raster, RasterLayer};
use climb_core::vector::{
    AttributeValue, Feature, FeatureSource, Field, FieldType, Fields, GeometryType, LineGeometry,
    MemoryLayer, SinkDescriptor, Vertex,
};
use climb_core::{Error, Result};

const ALGORITHM: &str = "climb:climbalongline";

// ── Fixtures ───────────────────────────────────────────────────────────

fn profile(zs: &[f64]) -> Vec<Vertex> {
    zs.iter()
        .enumerate()
        .map(|(i, &z)| Vertex::new(i as f64, 0.0, z))
        .collect()
}

fn z_layer(fields: Fields, geometries: Vec<LineGeometry>) -> MemoryLayer {
    let width = fields.len();
    let mut layer = MemoryLayer::new("routes", fields, GeometryType::MultiLineStringZ, None);
    for (id, geometry) in geometries.into_iter().enumerate() {
        let attributes = (0..width)
            .map(|i| AttributeValue::Int((id * 10 + i) as i64))
            .collect();
        layer.push(Feature::new(id as u64, geometry, attributes)).unwrap();
    }
    layer
}

fn params(source: MemoryLayer, output: &SinkDescriptor) -> Parameters {
    Parameters::new()
        .with(INPUT, ParamValue::Source(Rc::new(source)))
        .with(OUTPUT, ParamValue::Sink(output.clone()))
}

fn committed(output: &SinkDescriptor) -> MemoryLayer {
    match output {
        SinkDescriptor::Memory(store) => store.take().expect("sink was not finished"),
        other => panic!("unexpected sink {}", other),
    }
}

fn sample_geometries() -> Vec<LineGeometry> {
    vec![
        LineGeometry::single(profile(&[10.0, 15.0, 12.0, 18.0])),
        LineGeometry::new(vec![profile(&[100.0, 90.0, 95.0]), profile(&[5.0, 7.0])]),
        LineGeometry::single(profile(&[f64::NAN, f64::NAN])),
        LineGeometry::single(profile(&[-3.0, f64::NAN, 20.0])),
    ]
}

// ── Embedded Z ─────────────────────────────────────────────────────────

#[test]
fn layer_totals_are_sums_of_feature_values() {
    let provider = climb_provider().unwrap();
    let output = SinkDescriptor::memory("climb");
    let source = z_layer(Fields::new(), sample_geometries());
    let mut feedback = Feedback::new();

    let outputs = provider
        .run(ALGORITHM, &params(source, &output), &mut feedback)
        .unwrap();

    let expected: Vec<_> = sample_geometries().iter().map(accumulate_climb).collect();
    let climb: f64 = expected.iter().map(|s| s.climb).sum();
    let descent: f64 = expected.iter().map(|s| s.descent).sum();

    assert_relative_eq!(outputs.number(TOTAL_CLIMB).unwrap(), climb);
    assert_relative_eq!(outputs.number(TOTAL_DESCENT).unwrap(), descent);
    assert_relative_eq!(climb, 11.0 + 5.0 + 2.0 + 23.0);
    assert_relative_eq!(descent, 3.0 + 10.0);
    assert_eq!(outputs.number(MIN_ELEVATION), Some(-3.0));
    assert_eq!(outputs.number(MAX_ELEVATION), Some(100.0));
    assert_eq!(outputs.layer(OUTPUT), Some("memory:climb"));

    let layer = committed(&output);
    assert_eq!(layer.len(), 4);
    assert_eq!(layer.geometry_type(), GeometryType::MultiLineStringZ);

    // the all-NaN feature has 0/0 and an undefined range
    let empty = layer.get(2).unwrap();
    assert_eq!(
        empty.attributes,
        vec![
            AttributeValue::Float(0.0),
            AttributeValue::Float(0.0),
            AttributeValue::Null,
            AttributeValue::Null,
        ]
    );
    assert_eq!(feedback.debug_count(), 3);
    assert!(feedback.entries().is_empty());
}

#[test]
fn feature_order_does_not_change_totals() {
    let provider = climb_provider().unwrap();
    let mut reversed = sample_geometries();
    reversed.reverse();

    let forward_out = SinkDescriptor::memory("forward");
    let backward_out = SinkDescriptor::memory("backward");
    let forward = provider
        .run(
            ALGORITHM,
            &params(z_layer(Fields::new(), sample_geometries()), &forward_out),
            &mut Feedback::new(),
        )
        .unwrap();
    let backward = provider
        .run(
            ALGORITHM,
            &params(z_layer(Fields::new(), reversed), &backward_out),
            &mut Feedback::new(),
        )
        .unwrap();

    assert_relative_eq!(
        forward.number(TOTAL_CLIMB).unwrap(),
        backward.number(TOTAL_CLIMB).unwrap()
    );
    assert_eq!(forward.number(MIN_ELEVATION), backward.number(MIN_ELEVATION));
    assert_eq!(forward.number(MAX_ELEVATION), backward.number(MAX_ELEVATION));
}

#[test]
fn no_valid_elevation_gives_null_range() {
    let provider = climb_provider().unwrap();
    let output = SinkDescriptor::memory("nan");
    let source = z_layer(
        Fields::new(),
        vec![LineGeometry::single(profile(&[f64::NAN, f64::NAN, f64::NAN]))],
    );

    let outputs = provider
        .run(ALGORITHM, &params(source, &output), &mut Feedback::new())
        .unwrap();
    assert_eq!(outputs.number(TOTAL_CLIMB), Some(0.0));
    assert_eq!(outputs.get(MIN_ELEVATION), Some(&OutputValue::Number(None)));
    assert_eq!(outputs.get(MAX_ELEVATION), Some(&OutputValue::Number(None)));
}

// ── Field collisions ───────────────────────────────────────────────────

#[test]
fn colliding_input_fields_are_replaced() {
    let fields: Fields = vec![
        Field::new("name", FieldType::Int),
        Field::new("climb", FieldType::Int),
        Field::new("minelev", FieldType::Int),
    ]
    .into_iter()
    .collect();
    let geometry = LineGeometry::single(profile(&[10.0, 15.0, 12.0, 18.0]));
    let output = SinkDescriptor::memory("collide");
    let mut feedback = Feedback::new();

    climb_provider()
        .unwrap()
        .run(
            ALGORITHM,
            &params(z_layer(fields, vec![geometry]), &output),
            &mut feedback,
        )
        .unwrap();

    let warnings: Vec<_> = feedback.messages(LogLevel::Warning).collect();
    assert_eq!(
        warnings,
        vec![
            "Warning: existing climb attribute found and removed",
            "Warning: existing minelev attribute found and removed",
        ]
    );

    let layer = committed(&output);
    let names: Vec<_> = layer.fields().names().collect();
    assert_eq!(names, vec!["name", "climb", "descent", "minelev", "maxelev"]);

    let feature = layer.get(0).unwrap();
    assert_eq!(feature.attribute(layer.fields(), "name"), Some(&AttributeValue::Int(0)));
    assert_eq!(
        feature.attribute(layer.fields(), "climb"),
        Some(&AttributeValue::Float(11.0))
    );
    assert_eq!(
        feature.attribute(layer.fields(), "minelev"),
        Some(&AttributeValue::Float(10.0))
    );
}

// ── Cancellation and progress ──────────────────────────────────────────

#[test]
fn cancel_after_k_features_keeps_partial_result() {
    let geometries: Vec<_> = (0..10)
        .map(|i| LineGeometry::single(profile(&[0.0, 1.0 + i as f64])))
        .collect();
    let output = SinkDescriptor::memory("partial");

    let mut feedback = Feedback::new();
    let handle = feedback.cancel_handle();
    // progress reaches 30% once the third feature is written
    feedback = feedback.with_progress(move |percent| {
        if percent >= 30 {
            handle.cancel();
        }
    });

    let outputs = climb_provider()
        .unwrap()
        .run(
            ALGORITHM,
            &params(z_layer(Fields::new(), geometries), &output),
            &mut feedback,
        )
        .unwrap();

    let layer = committed(&output);
    assert_eq!(layer.len(), 3);
    assert_relative_eq!(outputs.number(TOTAL_CLIMB).unwrap(), 1.0 + 2.0 + 3.0);
    assert_eq!(outputs.number(MAX_ELEVATION), Some(3.0));
    assert_eq!(feedback.progress(), Some(30));
}

#[test]
fn progress_reaches_one_hundred() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut feedback = Feedback::new().with_progress(move |p| sink.borrow_mut().push(p));

    climb_provider()
        .unwrap()
        .run(
            ALGORITHM,
            &params(
                z_layer(Fields::new(), sample_geometries()),
                &SinkDescriptor::memory("progress"),
            ),
            &mut feedback,
        )
        .unwrap();

    assert_eq!(*seen.borrow(), vec![25, 50, 75, 100]);
}

// ── Elevation from a DEM ───────────────────────────────────────────────

/// 4x4 DEM over (0,0)-(4,4) whose value rises 10 per column eastwards
fn ramp_dem() -> Rc<RasterLayer> {
    let mut band = Raster::new(4, 4);
    band.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
    for row in 0..4 {
        for col in 0..4 {
            band.set(row, col, 100.0 + 10.0 * col as f64).unwrap();
        }
    }
    let mut second = band.clone();
    second.set(0, 0, 0.0).unwrap();
    Rc::new(RasterLayer::new("ramp", vec![band, second]).unwrap())
}

fn flat_layer() -> MemoryLayer {
    let line = LineGeometry::single(vec![
        Vertex::xy(0.5, 2.0),
        Vertex::xy(3.5, 2.0),
        Vertex::xy(1.5, 2.0),
    ]);
    MemoryLayer::new("flat", Fields::new(), GeometryType::LineString, None)
        .with_feature(Feature::new(0, line, vec![]))
        .unwrap()
}

#[test]
fn flat_lines_are_draped_on_the_dem() {
    let output = SinkDescriptor::memory("draped");
    let params = params(flat_layer(), &output)
        .with(DEM, ParamValue::Raster(ramp_dem()))
        .with(BAND, ParamValue::Band(1));
    let mut feedback = Feedback::new();

    let outputs = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params, &mut feedback)
        .unwrap();

    assert_relative_eq!(outputs.number(TOTAL_CLIMB).unwrap(), 30.0);
    assert_relative_eq!(outputs.number(TOTAL_DESCENT).unwrap(), 20.0);
    assert_eq!(outputs.number(MIN_ELEVATION), Some(100.0));
    assert_eq!(outputs.number(MAX_ELEVATION), Some(130.0));

    let layer = committed(&output);
    assert_eq!(layer.geometry_type(), GeometryType::LineStringZ);
    let zs: Vec<f64> = layer.get(0).unwrap().geometry.vertices().map(|v| v.z).collect();
    assert_eq!(zs, vec![100.0, 130.0, 110.0]);

    let infos: Vec<_> = feedback.messages(LogLevel::Info).collect();
    assert!(infos.contains(&"Adding Z values from DEM..."));
    assert!(infos.contains(&"Z values added."));
}

/// Drape that gives up on every layer
struct UnreachableDem;

impl Drape for UnreachableDem {
    fn drape(
        &self,
        _source: &dyn FeatureSource,
        raster: &RasterLayer,
        _band: usize,
        _feedback: &mut Feedback,
    ) -> Result<MemoryLayer> {
        Err(Error::Drape(format!("raster '{}' could not be read", raster.name())))
    }
}

#[test]
fn drape_failure_commits_nothing() {
    let output = SinkDescriptor::memory("never");
    let params = params(flat_layer(), &output)
        .with(DEM, ParamValue::Raster(ramp_dem()))
        .with(BAND, ParamValue::Band(1));
    let mut feedback = Feedback::new();

    let err = ClimbAlongLine::with_drape(UnreachableDem)
        .execute(&params, &mut feedback)
        .unwrap_err();

    assert!(matches!(err, Error::Drape(_)));
    assert!(!err.is_configuration());
    assert!(committed_or_none(&output).is_none());
    let infos: Vec<_> = feedback.messages(LogLevel::Info).collect();
    assert_eq!(infos, vec!["Adding Z values from DEM..."]);
}

#[test]
fn z_layer_ignores_dem() {
    let output = SinkDescriptor::memory("verbatim");
    let source = z_layer(
        Fields::new(),
        vec![LineGeometry::single(profile(&[1.0, 4.0]))],
    );
    let params = params(source, &output)
        .with(DEM, ParamValue::Raster(ramp_dem()))
        .with(BAND, ParamValue::Band(1));

    let outputs = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params, &mut Feedback::new())
        .unwrap();
    assert_eq!(outputs.number(TOTAL_CLIMB), Some(3.0));
}

// ── Configuration errors ───────────────────────────────────────────────

#[test]
fn flat_lines_without_dem_fail_before_processing() {
    let output = SinkDescriptor::memory("never");
    let mut feedback = Feedback::new();
    let err = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params(flat_layer(), &output), &mut feedback)
        .unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(err.to_string(), "The line layer has no Z values - a DEM is needed");
    assert!(committed_or_none(&output).is_none());
    assert!(feedback.entries().is_empty());
}

#[test]
fn out_of_range_band_is_rejected() {
    let output = SinkDescriptor::memory("never");
    let params = params(flat_layer(), &output)
        .with(DEM, ParamValue::Raster(ramp_dem()))
        .with(BAND, ParamValue::Band(3));
    let err = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params, &mut Feedback::new())
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(committed_or_none(&output).is_none());
}

#[test]
fn wrong_parameter_type_is_rejected() {
    let params = Parameters::new()
        .with(INPUT, ParamValue::Band(1))
        .with(OUTPUT, ParamValue::Sink(SinkDescriptor::memory("x")));
    let err = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params, &mut Feedback::new())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { name: "INPUT", .. }));
}

fn committed_or_none(output: &SinkDescriptor) -> Option<MemoryLayer> {
    match output {
        SinkDescriptor::Memory(store) => store.take(),
        SinkDescriptor::GeoJson(_) => None,
    }
}

// ── GeoJSON ────────────────────────────────────────────────────────────

const TRAILS: &str = r#"{
  "type": "FeatureCollection",
  "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::25833"}},
  "features": [
    {"type": "Feature", "properties": {"name": "ridge", "climb": 1},
     "geometry": {"type": "LineString",
                  "coordinates": [[0, 0, 10], [1, 0, 15], [2, 0, 12], [3, 0, 18]]}},
    {"type": "Feature", "properties": {"name": "gap", "climb": 2},
     "geometry": {"type": "LineString",
                  "coordinates": [[0, 1, 10], [1, 1, null], [2, 1, 10]]}}
  ]
}"#;

#[test]
fn geojson_round_trip_through_the_algorithm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("climb.geojson");
    let source = read_geojson_from_str("trails", TRAILS).unwrap();
    assert!(source.geometry_type().has_z());

    let output = SinkDescriptor::GeoJson(path.clone());
    let params = Parameters::new()
        .with(INPUT, ParamValue::Source(Rc::new(source)))
        .with(OUTPUT, ParamValue::Sink(output));
    let mut feedback = Feedback::new();

    let outputs = climb_provider()
        .unwrap()
        .run(ALGORITHM, &params, &mut feedback)
        .unwrap();
    assert_eq!(outputs.layer(OUTPUT), Some(path.display().to_string().as_str()));
    assert_eq!(outputs.number(TOTAL_CLIMB), Some(11.0));
    assert_eq!(feedback.messages(LogLevel::Warning).count(), 1);

    let written = read_geojson(&path).unwrap();
    assert_eq!(written.crs().and_then(|c| c.epsg()), Some(25833));
    let names: Vec<_> = written.fields().names().collect();
    assert_eq!(names, vec!["name", "climb", "descent", "minelev", "maxelev"]);

    let gap = written.get(1).unwrap();
    assert_eq!(gap.attribute(written.fields(), "climb"), Some(&AttributeValue::Float(0.0)));
    assert!(gap.geometry.vertices().nth(1).unwrap().z.is_nan());
}
