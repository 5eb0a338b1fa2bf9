pub mod json_api;

pub use json_api::{
    run_benchmark_json, score_json, BenchmarkRequest, ResponseInput, ScoreRequest,
    SCHEMA_VERSION,
};
