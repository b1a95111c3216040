use crate::data::get_default_servers;
use crate::error::AppError;
use crate::models::{Region, Server, ServerSummary};

/// Read-only server list, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerCatalog {
    servers: Vec<Server>,
}

impl Default for ServerCatalog {
    fn default() -> Self {
        Self::new(get_default_servers())
    }
}

impl ServerCatalog {
    pub fn new(servers: Vec<Server>) -> Self {
        Self { servers }
    }

    pub fn all(&self) -> &[Server] {
        &self.servers
    }

    pub fn first(&self) -> Option<&Server> {
        self.servers.first()
    }

    pub fn find(&self, id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Server, AppError> {
        self.find(id)
            .ok_or_else(|| AppError::UnknownServer(id.to_string()))
    }

    pub fn filter(&self, query: &str) -> Vec<&Server> {
        self.servers
            .iter()
            .filter(|s| matches_query(s, query))
            .collect()
    }

    pub fn in_region(&self, region: Region) -> Vec<&Server> {
        self.servers.iter().filter(|s| s.region == region).collect()
    }

    pub fn summaries(&self) -> Vec<ServerSummary> {
        self.servers.iter().map(Server::summary).collect()
    }
}

/// Name and country match case-insensitively, IP matches verbatim.
pub fn matches_query(server: &Server, query: &str) -> bool {
    let needle = query.to_lowercase();
    server.name.to_lowercase().contains(&needle)
        || server.country.to_lowercase().contains(&needle)
        || server.ip.contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(servers: Vec<&Server>) -> Vec<&str> {
        servers.into_iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_catalog_in_order() {
        let catalog = ServerCatalog::default();
        assert_eq!(
            ids(catalog.filter("")),
            vec!["1", "2", "3", "4", "5", "6", "7", "8"]
        );
    }

    #[test]
    fn test_filter_by_name_country_and_ip() {
        let catalog = ServerCatalog::default();
        assert_eq!(ids(catalog.filter("TOKYO")), vec!["3"]);
        assert_eq!(ids(catalog.filter("germany")), vec!["4"]);
        assert_eq!(ids(catalog.filter("128.199")), vec!["5"]);
        assert!(catalog.filter("atlantis").is_empty());
    }

    #[test]
    fn test_lookup() {
        let catalog = ServerCatalog::default();
        assert_eq!(catalog.get("7").unwrap().name, "Sydney #01");
        assert!(matches!(
            catalog.get("99"),
            Err(AppError::UnknownServer(id)) if id == "99"
        ));
        assert_eq!(ids(catalog.in_region(Region::Asia)), vec!["3", "5", "6"]);
        assert!(catalog.in_region(Region::Africa).is_empty());
    }

    #[test]
    fn test_summaries_follow_catalog_order() {
        let catalog = ServerCatalog::default();
        let summaries = catalog.summaries();
        assert_eq!(summaries.len(), 8);
        assert_eq!(summaries[0], catalog.all()[0].summary());
        assert_eq!(summaries[6].name, "Sydney #01");
    }
}
