use dohproxy_application::ports::{CacheMaintenancePort, DnsCachePort};
use dohproxy_application::use_cases::HandleDnsQueryUseCase;
use dohproxy_domain::Config;
use dohproxy_infrastructure::dns::{build_upstreams, DnsCache};
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub handler_use_case: Arc<HandleDnsQueryUseCase>,
    pub cache_maintenance: Option<Arc<dyn CacheMaintenancePort>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let rules = config.build_rules()?;
        let upstreams = build_upstreams(config)?;

        let mut use_case = HandleDnsQueryUseCase::new(rules, upstreams)?;
        let mut cache_maintenance = None;

        if config.cache.enabled {
            let cache = Arc::new(DnsCache::new());
            use_case = use_case.with_cache(cache.clone() as Arc<dyn DnsCachePort>);
            cache_maintenance = Some(cache as Arc<dyn CacheMaintenancePort>);
        }

        info!(
            rules = use_case.rule_count(),
            upstreams = use_case.upstream_count(),
            cache_enabled = config.cache.enabled,
            "DNS services initialized"
        );

        Ok(Self {
            handler_use_case: Arc::new(use_case),
            cache_maintenance,
        })
    }
}
