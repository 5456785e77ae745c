//! Cross-module tests for retrieval and sessions.


mod funnel_scenarios;
mod session_scenarios;
