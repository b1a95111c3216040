#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_recommendation_uses_camel_case_wire_names() {
        let parsed: RecommendationResult =
            serde_json::from_str(r#"{"serverId":"3","reason":"Low latency in Asia"}"#).unwrap();
        assert_eq!(parsed.server_id, "3");
        assert_eq!(parsed.reason, "Low latency in Asia");

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["serverId"], "3");
    }

    #[test]
    fn test_recommendation_requires_both_fields() {
        assert!(serde_json::from_str::<RecommendationResult>(r#"{"serverId":"3"}"#).is_err());
        assert!(serde_json::from_str::<RecommendationResult>(r#"{"reason":"x"}"#).is_err());
    }

    #[test]
    fn test_server_summary_projection() {
        let server = Server {
            id: "2".to_string(),
            name: "London #44".to_string(),
            country: "UK".to_string(),
            flag: "🇬🇧".to_string(),
            ip: "45.32.11.90".to_string(),
            ping: 38,
            load: 12,
            region: Region::Europe,
        };
        let value = serde_json::to_value(server.summary()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "id": "2", "name": "London #44", "ping": 38, "load": 12 })
        );
    }

    #[test]
    fn test_flatline_sample() {
        let sample = TelemetrySample::flatline();
        assert!(sample.is_flatline());
        assert!(sample.timestamp.is_empty());
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("OpenVPN UDP"), Some(Protocol::OpenVpnUdp));
        assert_eq!(Protocol::parse("openvpn-tcp"), Some(Protocol::OpenVpnTcp));
        assert_eq!(Protocol::parse("wg"), Some(Protocol::WireGuard));
        assert_eq!(Protocol::parse("ipsec"), None);
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
    }
}
