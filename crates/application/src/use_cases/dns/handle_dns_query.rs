use super::caching_writer::CachingWriter;
use crate::ports::{DnsCachePort, DnsUpstream, ResponseWriter};
use crate::services::build_static_answer;
use dohproxy_domain::{ConfigError, DomainError, Rule, RuleTarget};
use hickory_proto::op::{Message, Query};
use hickory_proto::rr::RecordType;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Routes each inbound query through the ordered rule list to a static answer
/// or a named upstream, reading and filling the cache on the upstream path.
pub struct HandleDnsQueryUseCase {
    rules: Vec<Rule>,
    upstreams: HashMap<Arc<str>, Arc<dyn DnsUpstream>>,
    cache: Option<Arc<dyn DnsCachePort>>,
}

impl HandleDnsQueryUseCase {
    /// Fails if a rule names an upstream that is not in `upstreams`.
    pub fn new(
        rules: Vec<Rule>,
        upstreams: impl IntoIterator<Item = Arc<dyn DnsUpstream>>,
    ) -> Result<Self, ConfigError> {
        let upstreams: HashMap<Arc<str>, Arc<dyn DnsUpstream>> = upstreams
            .into_iter()
            .map(|upstream| (Arc::from(upstream.name()), upstream))
            .collect();

        for rule in &rules {
            if let Some(name) = rule.upstream_name() {
                if !upstreams.contains_key(name) {
                    return Err(ConfigError::UnknownUpstream(name.to_string()));
                }
            }
        }

        Ok(Self {
            rules,
            upstreams,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<dyn DnsCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn upstream_count(&self) -> usize {
        self.upstreams.len()
    }

    /// Handle one query. At most one reply is written to `writer`.
    ///
    /// Unmatched queries are dropped without a reply and return `Ok(())`.
    ///
    /// Rules see the question name in its fully qualified form, trailing root
    /// dot included. Suffix and fqdn rules are indifferent to it; wildcard and
    /// regex patterns must account for it (`*.example.com.`, `example\.com\.$`).
    pub async fn execute(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
    ) -> Result<(), DomainError> {
        let Some(question) = request.queries().first() else {
            warn!(
                id = request.id(),
                from = %writer.remote_addr(),
                "Query carries no question, dropping"
            );
            return Err(DomainError::MalformedQuery(
                "query carries no question".to_string(),
            ));
        };

        if request.queries().len() > 1 {
            warn!(
                id = request.id(),
                count = request.queries().len(),
                "Query carries more than one question, routing the first only"
            );
        }

        let search_start = Instant::now();
        let domain = question.name().to_ascii();
        let matched = self.rules.iter().find(|rule| rule.matches(&domain));
        let search_time = search_start.elapsed();

        let upstream_label = match matched.map(Rule::target) {
            Some(RuleTarget::Upstream(name)) => name.as_ref(),
            Some(RuleTarget::Static(_)) => "static",
            None => "nil",
        };

        info!(
            target: "dohproxy::query",
            from = %writer.remote_addr(),
            to = %writer.local_addr(),
            upstream = upstream_label,
            question = %format_question(question),
            searchtime = ?search_time,
            id = request.id(),
            "routing request"
        );

        let Some(rule) = matched else {
            return Ok(());
        };

        match rule.target() {
            RuleTarget::Static(ip) => self.answer_static(writer, request, question, *ip),
            RuleTarget::Upstream(name) => self.forward(name, writer, request, question).await,
        }
    }

    fn answer_static(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &Message,
        question: &Query,
        ip: Ipv4Addr,
    ) -> Result<(), DomainError> {
        if question.query_type() != RecordType::A {
            error!(
                target: "dohproxy::query",
                id = request.id(),
                qtype = %question.query_type(),
                "Static result only answers A queries"
            );
            return Err(DomainError::UnsupportedQueryType(
                question.query_type().to_string(),
            ));
        }

        writer.write_message(&build_static_answer(request, ip))
    }

    async fn forward(
        &self,
        name: &str,
        writer: &mut dyn ResponseWriter,
        request: &Message,
        question: &Query,
    ) -> Result<(), DomainError> {
        let upstream = self
            .upstreams
            .get(name)
            .ok_or_else(|| DomainError::UnknownUpstream(name.to_string()))?;

        let result = match &self.cache {
            Some(cache) => {
                if let Some(cached) = cache.get(question, request.id()) {
                    debug!(id = request.id(), domain = %question.name(), "Cache hit");
                    return writer.write_message(&cached);
                }
                let mut caching = CachingWriter::new(writer, cache.as_ref(), question);
                upstream.query(&mut caching, request).await
            }
            None => upstream.query(writer, request).await,
        };

        if let Err(e) = &result {
            warn!(
                target: "dohproxy::answer",
                id = request.id(),
                upstream = name,
                error = %e,
                "Upstream exchange failed"
            );
        }
        result
    }
}

fn format_question(query: &Query) -> String {
    format!(
        "{} {} {}",
        query.name(),
        query.query_class(),
        query.query_type()
    )
}
