//! GeoJSON reading and streaming writing for line layers
//!
//! Only `LineString`/`MultiLineString` features are accepted. A third
//! coordinate is read as elevation; `null` in that position means "no
//! elevation" and becomes NaN.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{
    AttributeValue, Feature, FeatureSink, Field, FieldType, Fields, GeometryType, LineGeometry,
    MemoryLayer, Vertex,
};

/// Read a GeoJSON FeatureCollection file into a memory layer.
///
/// The layer is named after the file stem.
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<MemoryLayer> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "layer".to_string());
    read_geojson_from_str(&name, &text)
}

/// Parse GeoJSON text into a memory layer
pub fn read_geojson_from_str(name: &str, text: &str) -> Result<MemoryLayer> {
    let root: Value = serde_json::from_str(text)?;
    let obj = root
        .as_object()
        .ok_or_else(|| Error::Other("GeoJSON root is not an object".into()))?;

    match obj.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(Error::Other(format!(
                "expected a GeoJSON FeatureCollection, found {}",
                other.unwrap_or("no type")
            )))
        }
    }

    let crs = obj
        .get("crs")
        .and_then(|c| c.pointer("/properties/name"))
        .and_then(Value::as_str)
        .map(CRS::parse)
        .unwrap_or_else(CRS::wgs84);

    let raw_features = obj
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Other("FeatureCollection has no 'features' array".into()))?;

    let mut schema = SchemaBuilder::default();
    let mut multi = false;
    let mut has_z = false;
    let mut parsed = Vec::with_capacity(raw_features.len());

    for (index, raw) in raw_features.iter().enumerate() {
        let geometry_value = raw.get("geometry").unwrap_or(&Value::Null);
        let (geometry, is_multi, z) = parse_geometry(geometry_value)
            .map_err(|e| Error::UnsupportedGeometry(format!("feature {}: {}", index, e)))?;
        multi |= is_multi;
        has_z |= z;

        let properties = raw
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        schema.observe(&properties);
        parsed.push((geometry, properties));
    }

    let fields = schema.build();
    let geometry_type = GeometryType::from_flags(multi, has_z);
    let mut layer = MemoryLayer::new(name, fields.clone(), geometry_type, Some(crs));

    for (id, (geometry, properties)) in parsed.into_iter().enumerate() {
        let attributes = fields
            .iter()
            .map(|field| {
                let value = properties.get(&field.name).unwrap_or(&Value::Null);
                coerce(json_to_attribute(value), field.field_type)
            })
            .collect();
        layer.push(Feature::new(id as u64, geometry, attributes))?;
    }

    debug!(
        "Read {} feature(s) from '{}' ({}, {} field(s))",
        layer.len(),
        name,
        geometry_type,
        fields.len()
    );
    Ok(layer)
}

/// Write a whole memory layer as a GeoJSON file
pub fn write_geojson<P: AsRef<Path>>(layer: &MemoryLayer, path: P) -> Result<()> {
    use crate::vector::FeatureSource;

    let mut sink = Box::new(GeoJsonSink::create(
        path.as_ref(),
        layer.fields().clone(),
        layer.geometry_type(),
        layer.crs().cloned(),
    )?);
    for feature in layer.iter() {
        sink.add_feature(feature.clone())?;
    }
    FeatureSink::finish(sink)
}

/// Streaming GeoJSON writer.
///
/// Features go to `<path>.partial`; [`FeatureSink::finish`] closes the
/// collection and renames it into place. An unfinished sink removes its
/// partial file when dropped.
#[derive(Debug)]
pub struct GeoJsonSink {
    path: PathBuf,
    partial: PathBuf,
    writer: Option<BufWriter<File>>,
    fields: Fields,
    geometry_type: GeometryType,
    written: usize,
}

impl GeoJsonSink {
    pub fn create<P: AsRef<Path>>(
        path: P,
        fields: Fields,
        geometry_type: GeometryType,
        crs: Option<CRS>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut partial = path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let mut writer = BufWriter::new(File::create(&partial)?);
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Header: everything up to the opening bracket of "features"
        write!(writer, "{{\"type\":\"FeatureCollection\",\"name\":")?;
        serde_json::to_writer(&mut writer, &name)?;
        if let Some(crs) = &crs {
            write!(writer, ",\"crs\":")?;
            let member = json!({"type": "name", "properties": {"name": crs.ogc_urn()}});
            serde_json::to_writer(&mut writer, &member)?;
        }
        writeln!(writer, ",\"features\":[")?;

        Ok(Self {
            path,
            partial,
            writer: Some(writer),
            fields,
            geometry_type,
            written: 0,
        })
    }

    /// Number of features written so far
    pub fn written(&self) -> usize {
        self.written
    }

    fn feature_json(&self, feature: &Feature) -> Value {
        let mut properties = Map::with_capacity(self.fields.len());
        for (field, value) in self.fields.iter().zip(&feature.attributes) {
            properties.insert(field.name.clone(), attribute_to_json(value));
        }
        json!({
            "type": "Feature",
            "id": feature.id,
            "geometry": geometry_to_json(&feature.geometry, self.geometry_type),
            "properties": properties,
        })
    }
}

impl FeatureSink for GeoJsonSink {
    fn add_feature(&mut self, feature: Feature) -> Result<()> {
        if feature.attributes.len() != self.fields.len() {
            return Err(Error::InvalidParameter {
                name: "attributes",
                value: feature.attributes.len().to_string(),
                reason: format!("sink expects {} field(s)", self.fields.len()),
            });
        }
        let value = self.feature_json(&feature);
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Other("GeoJSON sink already finished".into()))?;
        if self.written > 0 {
            writeln!(writer, ",")?;
        }
        serde_json::to_writer(&mut *writer, &value)?;
        self.written += 1;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Other("GeoJSON sink already finished".into()))?;
        let closed = writeln!(writer, "\n]}}").and_then(|_| writer.flush());
        drop(writer);

        // Nothing may be left behind when the commit fails
        if let Err(e) = closed.and_then(|_| fs::rename(&self.partial, &self.path)) {
            let _ = fs::remove_file(&self.partial);
            return Err(e.into());
        }
        debug!("Wrote {} feature(s) to {}", self.written, self.path.display());
        Ok(())
    }
}

impl Drop for GeoJsonSink {
    fn drop(&mut self) {
        // Still holding the writer means finish() never ran
        if self.writer.take().is_some() {
            let _ = fs::remove_file(&self.partial);
        }
    }
}

/// Tracks property names in first-seen order and their widened types
#[derive(Default)]
struct SchemaBuilder {
    columns: Vec<(String, Option<FieldType>)>,
}

impl SchemaBuilder {
    fn observe(&mut self, properties: &Map<String, Value>) {
        for (key, value) in properties {
            let observed = json_to_attribute(value).field_type();
            match self.columns.iter_mut().find(|(name, _)| name == key) {
                Some((_, current)) => {
                    if let Some(t) = observed {
                        *current = Some(current.map_or(t, |c| c.widen(t)));
                    }
                }
                None => self.columns.push((key.clone(), observed)),
            }
        }
    }

    fn build(self) -> Fields {
        self.columns
            .into_iter()
            .map(|(name, t)| Field::new(name, t.unwrap_or(FieldType::String)))
            .collect()
    }
}

fn parse_geometry(value: &Value) -> std::result::Result<(LineGeometry, bool, bool), String> {
    if value.is_null() {
        return Ok((LineGeometry::empty(), false, false));
    }
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry has no type")?;
    let coords = value
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or("geometry has no coordinates")?;

    let mut has_z = false;
    match kind {
        "LineString" => {
            let part = parse_part(coords, &mut has_z)?;
            Ok((LineGeometry::single(part), false, has_z))
        }
        "MultiLineString" => {
            let parts = coords
                .iter()
                .map(|part| -> std::result::Result<Vec<Vertex>, String> {
                    let part = part.as_array().ok_or("line part is not an array")?;
                    parse_part(part, &mut has_z)
                })
                .collect::<std::result::Result<Vec<_>, String>>()?;
            Ok((LineGeometry::new(parts), true, has_z))
        }
        other => Err(format!("{} is not a line geometry", other)),
    }
}

fn parse_part(positions: &[Value], has_z: &mut bool) -> std::result::Result<Vec<Vertex>, String> {
    positions
        .iter()
        .map(|position| -> std::result::Result<Vertex, String> {
            let p = position.as_array().ok_or("position is not an array")?;
            if p.len() < 2 {
                return Err("position needs at least two numbers".to_string());
            }
            let x = p[0].as_f64().ok_or("x is not a number")?;
            let y = p[1].as_f64().ok_or("y is not a number")?;
            let z = match p.get(2) {
                Some(v) => {
                    *has_z = true;
                    v.as_f64().unwrap_or(f64::NAN)
                }
                None => f64::NAN,
            };
            Ok(Vertex::new(x, y, z))
        })
        .collect()
}

fn geometry_to_json(geometry: &LineGeometry, geometry_type: GeometryType) -> Value {
    if geometry.is_empty() {
        return Value::Null;
    }
    let has_z = geometry_type.has_z();
    let part_json = |part: &Vec<Vertex>| -> Value {
        Value::Array(
            part.iter()
                .map(|v| {
                    if has_z {
                        json!([v.x, v.y, v.elevation()])
                    } else {
                        json!([v.x, v.y])
                    }
                })
                .collect(),
        )
    };

    let parts = geometry.parts();
    if !geometry_type.is_multi() && parts.len() == 1 {
        json!({"type": "LineString", "coordinates": part_json(&parts[0])})
    } else {
        let lines: Vec<Value> = parts.iter().map(part_json).collect();
        json!({"type": "MultiLineString", "coordinates": lines})
    }
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
        },
        Value::String(s) => AttributeValue::String(s.clone()),
        other => AttributeValue::String(other.to_string()),
    }
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(i) => json!(i),
        // NaN and infinities have no JSON representation and become null
        AttributeValue::Float(f) => json!(f),
        AttributeValue::String(s) => Value::String(s.clone()),
    }
}

/// Convert a value to the storage type of its field
fn coerce(value: AttributeValue, field_type: FieldType) -> AttributeValue {
    match (value, field_type) {
        (AttributeValue::Int(i), FieldType::Float) => AttributeValue::Float(i as f64),
        (AttributeValue::Null, _) => AttributeValue::Null,
        (AttributeValue::String(s), FieldType::String) => AttributeValue::String(s),
        (AttributeValue::Bool(b), FieldType::String) => AttributeValue::String(b.to_string()),
        (AttributeValue::Int(i), FieldType::String) => AttributeValue::String(i.to_string()),
        (AttributeValue::Float(f), FieldType::String) => AttributeValue::String(f.to_string()),
        (value, _) => value,
    }
}
