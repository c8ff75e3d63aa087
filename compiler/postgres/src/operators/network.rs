use nestql::DeclaredType;
use serde_json::Value;

use super::helpers::{build_common, expect_bool, is_common, CastStrategy};
use super::{FieldExpr, OperatorStrategy};
use crate::error::CompileError;
use crate::literal::typed_literal;

/// Ports compare as integers. Out-of-range values are left for the database to reject.
pub fn port() -> CastStrategy { CastStrategy::new("port", DeclaredType::Port, "integer") }

pub fn mac_address() -> CastStrategy { CastStrategy::new("mac_address", DeclaredType::MacAddress, "macaddr") }

const PRIVATE_RANGES: &[&str] = &["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "169.254.0.0/16"];
const INET_OPERATORS: &[&str] =
    &["in_subnet", "contains_subnet", "contains_ip", "overlaps", "is_private", "is_public", "is_loopback", "is_ipv4", "is_ipv6"];

#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddressStrategy;

impl OperatorStrategy for IpAddressStrategy {
    fn name(&self) -> &'static str { "ip_address" }

    fn supports(&self, operator: &str, declared_type: Option<&DeclaredType>) -> bool {
        matches!(declared_type, Some(DeclaredType::IpAddress)) && (is_common(operator) || INET_OPERATORS.contains(&operator))
    }

    fn build(&self, operator: &str, value: &Value, field: &FieldExpr, _: Option<&DeclaredType>) -> Result<String, CompileError> {
        let addr = field.cast("inet");
        match operator {
            "in_subnet" => Ok(format!("{} <<= {}", addr, typed_literal(operator, value, Some("inet"))?)),
            "contains_subnet" => Ok(format!("{} >>= {}", addr, typed_literal(operator, value, Some("inet"))?)),
            "contains_ip" => Ok(format!("{} >> {}", addr, typed_literal(operator, value, Some("inet"))?)),
            "overlaps" => Ok(format!("{} && {}", addr, typed_literal(operator, value, Some("inet"))?)),
            "is_private" => Ok(switch(expect_bool(operator, value)?, private_ranges(&addr))),
            "is_public" => Ok(switch(!expect_bool(operator, value)?, private_ranges(&addr))),
            "is_loopback" => Ok(switch(
                expect_bool(operator, value)?,
                format!("((family({addr}) = 4 AND {addr} << '127.0.0.0/8'::inet) OR (family({addr}) = 6 AND {addr} = '::1'::inet))"),
            )),
            "is_ipv4" => Ok(format!("family({}) {} 4", addr, if expect_bool(operator, value)? { "=" } else { "!=" })),
            "is_ipv6" => Ok(format!("family({}) {} 6", addr, if expect_bool(operator, value)? { "=" } else { "!=" })),
            _ => build_common(operator, value, field, Some("inet")),
        }
    }
}

fn private_ranges(addr: &str) -> String {
    let terms = PRIVATE_RANGES.iter().map(|range| format!("{} << '{}'::inet", addr, range)).collect::<Vec<_>>();
    format!("({})", terms.join(" OR "))
}

fn switch(positive: bool, condition: String) -> String {
    if positive {
        condition
    } else {
        format!("NOT {}", condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str) -> FieldExpr { FieldExpr::Json(format!("data->>'{}'", name)) }

    #[test]
    fn test_port_uses_integer_cast() -> anyhow::Result<()> {
        let port = port();
        assert_eq!(port.build("gt", &json!(1024), &field("port"), None)?, "(data->>'port')::integer > 1024");
        assert_eq!(port.build("in", &json!([80, 443]), &field("port"), None)?, "(data->>'port')::integer IN (80, 443)");
        assert_eq!(port.build("eq", &json!(99999), &field("port"), None)?, "(data->>'port')::integer = 99999");
        Ok(())
    }

    #[test]
    fn test_mac_address() -> anyhow::Result<()> {
        assert_eq!(
            mac_address().build("eq", &json!("08:00:2b:01:02:03"), &field("mac"), None)?,
            "(data->>'mac')::macaddr = '08:00:2b:01:02:03'::macaddr"
        );
        Ok(())
    }

    #[test]
    fn test_inet_operators() -> anyhow::Result<()> {
        let s = IpAddressStrategy;
        assert_eq!(s.build("in_subnet", &json!("10.0.0.0/8"), &field("ip"), None)?, "(data->>'ip')::inet <<= '10.0.0.0/8'::inet");
        assert_eq!(s.build("is_ipv4", &json!(true), &field("ip"), None)?, "family((data->>'ip')::inet) = 4");
        assert_eq!(s.build("is_ipv6", &json!(false), &field("ip"), None)?, "family((data->>'ip')::inet) != 6");
        assert_eq!(
            s.build("is_private", &json!(true), &FieldExpr::Column("ip".into()), None)?,
            "(ip << '10.0.0.0/8'::inet OR ip << '172.16.0.0/12'::inet OR ip << '192.168.0.0/16'::inet OR ip << '169.254.0.0/16'::inet)"
        );
        assert!(s.build("is_public", &json!(true), &field("ip"), None)?.starts_with("NOT ((data->>'ip')::inet << '10.0.0.0/8'::inet"));
        assert!(s.build("is_private", &json!("yes"), &field("ip"), None).is_err());
        Ok(())
    }

    #[test]
    fn test_network_containment() -> anyhow::Result<()> {
        let s = IpAddressStrategy;
        let network = field("network");
        assert!(s.supports("contains_subnet", Some(&DeclaredType::IpAddress)));
        assert!(!s.supports("overlaps", Some(&DeclaredType::String)));
        assert_eq!(s.build("contains_subnet", &json!("10.1.0.0/16"), &network, None)?, "(data->>'network')::inet >>= '10.1.0.0/16'::inet");
        assert_eq!(s.build("contains_ip", &json!("10.1.2.3"), &network, None)?, "(data->>'network')::inet >> '10.1.2.3'::inet");
        assert_eq!(s.build("overlaps", &json!("10.0.0.0/8"), &FieldExpr::Column("network".into()), None)?, "network && '10.0.0.0/8'::inet");
        assert!(matches!(s.build("contains_ip", &json!(["10.1.2.3"]), &network, None), Err(CompileError::MalformedValue { .. })));
        Ok(())
    }
}
