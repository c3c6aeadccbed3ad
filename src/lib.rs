// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

#![deny(missing_docs)]

//! `datafusion-cache-eligibility` decides whether a DataFusion query may be served from a cached plan
//! or from a materialized view, and whether such a view can be maintained incrementally.

use std::collections::BTreeSet;

/// Classification of expressions and logical plans into plan-cache and materialized view verdicts.
///
/// Every function call in a query is classified using two intrinsic properties:
/// whether it is deterministic, and whether it is "dynamic", i.e. depends on the context
/// the query runs in (the current time, the current user) rather than only on its arguments.
/// Verdicts for individual calls are then AND-folded across the whole [`Expr`](datafusion_expr::Expr)
/// or [`LogicalPlan`](datafusion_expr::LogicalPlan).
///
/// The resulting [`Verdict`](eligibility::Verdict) answers three independent questions:
///
/// * can the plan be cached and reused across executions;
/// * can a materialized view defined by this query be substituted for it;
/// * can such a materialized view be refreshed incrementally.
///
/// Consumers such as a plan cache or a view-matching rewriter act on these verdicts;
/// this crate never rewrites or executes anything itself.
pub mod eligibility;

pub use eligibility::{classify_expr, classify_operator, classify_plan, Classifier, Verdict};

/// Dynamic functions whose results may be served stale from a materialized view.
///
/// A materialized view is stale by construction: it was correct when it was last refreshed and
/// will be correct again after the next refresh. Time functions fit that model, so a view built
/// over `now()` is still matchable. Functions like `current_user()` do not: a result computed for
/// another user was never correct for this one.
pub const DEFAULT_MATCHABLE_DYNAMIC_FUNCTIONS: &[&str] = &[
    "CURRENT_TIME",
    "CURRENT_DATE",
    "CURRENT_TIMESTAMP",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOW",
    "STATEMENT_TIMESTAMP",
    "TRANSACTION_TIMESTAMP",
    "CURRENT_TIME_UTC",
    "CURRENT_DATE_UTC",
    "CURRENT_TIMESTAMP_UTC",
    "TIMEOFDAY",
    "UNIX_TIMESTAMP",
];

/// Configuration options for eligibility classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityConfig {
    /// Upper-cased names of dynamic functions that do not prevent materialized view matching.
    /// Membership never affects plan caching or incremental refresh.
    pub matchable_dynamic_functions: BTreeSet<String>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            matchable_dynamic_functions: DEFAULT_MATCHABLE_DYNAMIC_FUNCTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl EligibilityConfig {
    /// A configuration whose allow-list is empty: every dynamic function prevents matching.
    pub fn strict() -> Self {
        Self {
            matchable_dynamic_functions: BTreeSet::new(),
        }
    }

    /// Allow materialized view matching over the named dynamic function.
    pub fn with_matchable_dynamic_function(mut self, name: impl AsRef<str>) -> Self {
        self.matchable_dynamic_functions
            .insert(name.as_ref().to_ascii_uppercase());
        self
    }

    /// Remove the named function from the allow-list.
    pub fn without_matchable_dynamic_function(mut self, name: impl AsRef<str>) -> Self {
        self.matchable_dynamic_functions
            .remove(&name.as_ref().to_ascii_uppercase());
        self
    }

    /// Whether the named dynamic function may be matched against a materialized view.
    /// Comparison is case-insensitive.
    pub fn is_matchable_dynamic_function(&self, name: &str) -> bool {
        self.matchable_dynamic_functions
            .contains(&name.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod test {
    use super::EligibilityConfig;

    #[test]
    fn test_default_allow_list() {
        let config = EligibilityConfig::default();

        for name in ["now", "NOW", "Current_Date", "unix_timestamp"] {
            assert!(config.is_matchable_dynamic_function(name), "{name}");
        }

        for name in ["current_user", "session_user", "random"] {
            assert!(!config.is_matchable_dynamic_function(name), "{name}");
        }
    }

    #[test]
    fn test_allow_list_builders() {
        let config = EligibilityConfig::strict().with_matchable_dynamic_function("date_trunc");
        assert!(config.is_matchable_dynamic_function("DATE_TRUNC"));
        assert!(!config.is_matchable_dynamic_function("now"));

        let config = EligibilityConfig::default().without_matchable_dynamic_function("Now");
        assert!(!config.is_matchable_dynamic_function("now"));
        assert!(config.is_matchable_dynamic_function("current_timestamp"));
    }
}
