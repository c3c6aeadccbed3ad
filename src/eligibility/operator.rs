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

use datafusion_expr::{registry::FunctionRegistry, Volatility};

use crate::EligibilityConfig;

use super::Verdict;

/// Intrinsic properties of a function or operator, as reported by an [`OperatorCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDescriptor {
    name: String,
    deterministic: bool,
    dynamic: bool,
}

impl OperatorDescriptor {
    /// Describe an operator by its two intrinsic properties.
    pub fn new(name: impl Into<String>, deterministic: bool, dynamic: bool) -> Self {
        Self {
            name: name.into(),
            deterministic,
            dynamic,
        }
    }

    /// An operator nothing is known about. It is treated as both
    /// non-deterministic and dynamic, so it never grants anything.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, false, true)
    }

    /// Derive the properties of a DataFusion function from its declared [`Volatility`].
    ///
    /// * `Immutable` functions are deterministic and not dynamic.
    /// * `Stable` functions return the same value for every row of one query, but depend on
    ///   the context the query runs in (`now()`), which makes them dynamic.
    /// * `Volatile` functions may return a different value on every call (`random()`).
    pub fn from_volatility(name: impl Into<String>, volatility: Volatility) -> Self {
        match volatility {
            Volatility::Immutable => Self::new(name, true, false),
            Volatility::Stable => Self::new(name, true, true),
            Volatility::Volatile => Self::new(name, false, false),
        }
    }

    /// Name of the operator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the operator always produces the same output for the same arguments.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Whether the operator's output depends on the execution context rather than only its arguments.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

/// A source of [`OperatorDescriptor`]s, keyed by operator name.
pub trait OperatorCatalog: std::fmt::Debug + Send + Sync {
    /// Describe the named operator, or return `None` if it is not registered.
    fn describe(&self, name: &str) -> Option<OperatorDescriptor>;
}

/// An [`OperatorCatalog`] backed by a DataFusion [`FunctionRegistry`], such as a
/// [`SessionState`](datafusion::execution::session_state::SessionState).
///
/// Scalar functions are looked up first, then aggregate functions, then window functions.
#[derive(Debug)]
pub struct FunctionRegistryCatalog<R> {
    registry: R,
}

impl<R: FunctionRegistry> FunctionRegistryCatalog<R> {
    /// Wrap a function registry.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    fn lookup(&self, name: &str) -> Option<OperatorDescriptor> {
        if let Ok(udf) = self.registry.udf(name) {
            return Some(OperatorDescriptor::from_volatility(
                udf.name(),
                udf.signature().volatility,
            ));
        }

        if let Ok(udaf) = self.registry.udaf(name) {
            return Some(OperatorDescriptor::from_volatility(
                udaf.name(),
                udaf.signature().volatility,
            ));
        }

        self.registry.udwf(name).ok().map(|udwf| {
            OperatorDescriptor::from_volatility(udwf.name(), udwf.signature().volatility)
        })
    }
}

impl<R: FunctionRegistry + std::fmt::Debug + Send + Sync> OperatorCatalog
    for FunctionRegistryCatalog<R>
{
    fn describe(&self, name: &str) -> Option<OperatorDescriptor> {
        // DataFusion registers functions under lower-cased names
        self.lookup(name)
            .or_else(|| self.lookup(&name.to_ascii_lowercase()))
    }
}

/// An operator that is always classified as fully permissive, whatever its catalog says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExemptOperator {
    /// Upper-cased operator name.
    pub name: &'static str,
    /// Why the exemption exists.
    pub reason: &'static str,
}

/// Operators exempt from classification.
///
/// This is technical debt. Entries here bypass the general rules and should be removed
/// as soon as the underlying operator is reported correctly by its catalog.
pub static EXEMPT_OPERATORS: &[ExemptOperator] = &[ExemptOperator {
    name: "FLATTEN",
    reason: "flatten changes row cardinality, so it is declared non-deterministic to keep \
             expression simplification from folding it into a constant; its results are \
             still safe to cache. Remove once flatten is retired.",
}];

/// Look up an exemption by operator name, case-insensitively.
pub fn exemption(name: &str) -> Option<&'static ExemptOperator> {
    EXEMPT_OPERATORS
        .iter()
        .find(|exempt| exempt.name.eq_ignore_ascii_case(name))
}

/// Classify a single operator, ignoring its arguments.
pub(crate) fn classify_descriptor(op: &OperatorDescriptor, config: &EligibilityConfig) -> Verdict {
    let mut verdict = Verdict::permissive();

    if let Some(exempt) = exemption(op.name()) {
        log::trace!("operator '{}' is exempt: {}", op.name(), exempt.reason);
        return verdict;
    }

    if op.is_dynamic() || !op.is_deterministic() {
        verdict.deny_plan_cache();
    }

    if op.is_dynamic() {
        verdict.deny_incremental_refresh();

        if !config.is_matchable_dynamic_function(op.name()) {
            verdict.deny_reflection_matching();
        }
    }

    if !verdict.is_permissive() {
        log::trace!("operator '{}' restricts eligibility: {verdict:?}", op.name());
    }

    verdict
}
