use crate::models::{Region, Server};
use once_cell::sync::Lazy;

static DEFAULT_SERVERS: Lazy<Vec<Server>> = Lazy::new(|| {
    vec![
        server("1", "New York #102", "USA", "🇺🇸", "192.168.1.45", 24, 45, Region::Americas),
        server("2", "London #44", "UK", "🇬🇧", "45.32.11.90", 38, 12, Region::Europe),
        server("3", "Tokyo Fast", "Japan", "🇯🇵", "103.4.55.21", 120, 78, Region::Asia),
        server("4", "Berlin Secure", "Germany", "🇩🇪", "88.99.102.3", 42, 30, Region::Europe),
        server("5", "Singapore #2", "Singapore", "🇸🇬", "128.199.1.5", 95, 55, Region::Asia),
        server("6", "Mumbai Express", "India", "🇮🇳", "13.232.1.1", 88, 62, Region::Asia),
        server("7", "Sydney #01", "Australia", "🇦🇺", "54.66.1.10", 160, 20, Region::Oceania),
        server("8", "Sao Paulo", "Brazil", "🇧🇷", "177.71.1.20", 145, 40, Region::Americas),
    ]
});

#[allow(clippy::too_many_arguments)]
fn server(
    id: &str,
    name: &str,
    country: &str,
    flag: &str,
    ip: &str,
    ping: u32,
    load: u8,
    region: Region,
) -> Server {
    Server {
        id: id.to_string(),
        name: name.to_string(),
        country: country.to_string(),
        flag: flag.to_string(),
        ip: ip.to_string(),
        ping,
        load,
        region,
    }
}

pub fn get_default_servers() -> Vec<Server> {
    DEFAULT_SERVERS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let servers = get_default_servers();
        let ids: HashSet<_> = servers.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), servers.len());
        assert_eq!(servers.len(), 8);
    }

    #[test]
    fn test_catalog_loads_are_percentages() {
        assert!(get_default_servers().iter().all(|s| s.load <= 100));
    }
}
