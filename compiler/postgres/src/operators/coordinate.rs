use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{expect_list, expect_number, null_check};
use super::{FieldExpr, OperatorStrategy};
use crate::config::DistanceMethod;
use crate::error::CompileError;

/// Mean earth radius in meters, used by the haversine form.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

const DISTANCE_OPERATORS: &[&str] = &["distance_within", "distance_within_postgis", "distance_within_haversine", "distance_within_earthdistance"];

/// Geographic points stored as Postgres point text `(lng,lat)`, i.e. x is longitude.
///
/// Values are given latitude first, as `[lat, lng]` or `{"lat": .., "lng": ..}`.
/// `distance_within` takes `[lat, lng, radius_meters]` and compiles to the configured
/// [`DistanceMethod`]; the suffixed operators pick a form explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateStrategy {
    method: DistanceMethod,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    fn point(&self) -> String { format!("POINT({}, {})", self.lng, self.lat) }
}

impl CoordinateStrategy {
    pub fn new(method: DistanceMethod) -> Self { Self { method } }

    fn method_for(&self, operator: &str) -> DistanceMethod {
        match operator {
            "distance_within_postgis" => DistanceMethod::PostGis,
            "distance_within_haversine" => DistanceMethod::Haversine,
            "distance_within_earthdistance" => DistanceMethod::EarthDistance,
            _ => self.method,
        }
    }
}

impl OperatorStrategy for CoordinateStrategy {
    fn name(&self) -> &'static str { "coordinate" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        matches!(declared_type, Some(DeclaredType::Coordinate))
            && (matches!(operator, "eq" | "neq" | "in" | "notin" | "isnull") || DISTANCE_OPERATORS.contains(&operator))
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        let point = field.cast("point");
        match operator {
            "isnull" => null_check(operator, value, field),
            "eq" => Ok(format!("{} ~= {}", point, lat_lng(operator, value)?.point())),
            "neq" => Ok(format!("NOT ({} ~= {})", point, lat_lng(operator, value)?.point())),
            "in" | "notin" => {
                let items = expect_list(operator, value)?;
                if items.is_empty() {
                    return Ok(if operator == "in" { "FALSE" } else { "TRUE" }.to_string());
                }
                let terms = items.iter().map(|item| Ok(format!("{} ~= {}", point, lat_lng(operator, item)?.point()))).collect::<Result<Vec<_>, CompileError>>()?;
                let any = format!("({})", terms.join(" OR "));
                Ok(if operator == "in" { any } else { format!("NOT {}", any) })
            }
            _ => {
                let (center, radius) = center_and_radius(operator, value)?;
                Ok(match self.method_for(operator) {
                    DistanceMethod::PostGis => postgis(&point, center, radius),
                    DistanceMethod::Haversine => haversine(&point, center, radius),
                    DistanceMethod::EarthDistance => earth_distance(&point, center, radius),
                })
            }
        }
    }
}

fn postgis(point: &str, center: LatLng, radius: f64) -> String {
    format!(
        "ST_DWithin(ST_SetSRID({}::geometry, 4326)::geography, ST_SetSRID(ST_MakePoint({}, {}), 4326)::geography, {})",
        point, center.lng, center.lat, radius
    )
}

fn haversine(point: &str, center: LatLng, radius: f64) -> String {
    let (lat, lng) = (format!("({})[1]", point), format!("({})[0]", point));
    format!(
        "(2 * {} * asin(sqrt(power(sin(radians({} - {}) / 2), 2) + cos(radians({})) * cos(radians({})) * power(sin(radians({} - {}) / 2), 2)))) <= {}",
        EARTH_RADIUS_METERS, lat, center.lat, center.lat, lat, lng, center.lng, radius
    )
}

fn earth_distance(point: &str, center: LatLng, radius: f64) -> String {
    format!("earth_distance(ll_to_earth(({p})[1], ({p})[0]), ll_to_earth({}, {})) <= {}", center.lat, center.lng, radius, p = point)
}

fn lat_lng(operator: &str, value: &Value) -> Result<LatLng, CompileError> {
    match value {
        Value::Array(items) => match items.as_slice() {
            [lat, lng] => Ok(LatLng { lat: expect_number(operator, lat)?, lng: expect_number(operator, lng)? }),
            _ => Err(CompileError::malformed(operator, format!("expected [lat, lng], got {} items", items.len()))),
        },
        Value::Object(_) => Ok(LatLng { lat: member(operator, value, &["lat", "latitude"])?, lng: member(operator, value, &["lng", "longitude"])? }),
        _ => Err(CompileError::malformed(operator, format!("expected a coordinate pair, got {}", value))),
    }
}

fn center_and_radius(operator: &str, value: &Value) -> Result<(LatLng, f64), CompileError> {
    let (center, radius) = match value {
        Value::Array(items) => match items.as_slice() {
            [lat, lng, radius] => {
                (LatLng { lat: expect_number(operator, lat)?, lng: expect_number(operator, lng)? }, expect_number(operator, radius)?)
            }
            _ => return Err(CompileError::malformed(operator, format!("expected [lat, lng, radius], got {} items", items.len()))),
        },
        Value::Object(_) => (lat_lng(operator, value)?, member(operator, value, &["radius", "radius_meters"])?),
        _ => return Err(CompileError::malformed(operator, format!("expected [lat, lng, radius], got {}", value))),
    };
    if !radius.is_finite() || radius < 0.0 {
        return Err(CompileError::malformed(operator, format!("radius must be a non-negative number, got {}", radius)));
    }
    Ok((center, radius))
}

fn member(operator: &str, value: &Value, keys: &[&str]) -> Result<f64, CompileError> {
    match keys.iter().find_map(|key| value.get(key)) {
        Some(found) => expect_number(operator, found),
        None => Err(CompileError::malformed(operator, format!("missing `{}`", keys[0]))),
    }
}
