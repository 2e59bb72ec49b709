use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref QUERY_TOTAL: Counter =
        register_counter!("aquamind_llm_queries_total", "Total number of LLM queries").unwrap();
    pub static ref QUERY_REJECTED: Counter =
        register_counter!("aquamind_llm_queries_rejected_total", "LLM queries rejected by admission").unwrap();
    pub static ref UPSTREAM_ERRORS: Counter =
        register_counter!("aquamind_llm_upstream_errors_total", "Failed calls to the LLM provider").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "aquamind_llm_upstream_latency_seconds",
        "LLM provider latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("aquamind_admission_tracked_clients", "Client identities held by the admission controller").unwrap();
}
