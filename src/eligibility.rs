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

/// The verdict type and its AND-fold.
mod verdict;

/// Operator descriptors, catalogs, and the per-operator classification rules.
pub mod operator;

/// Classification of expression trees.
mod expr;

/// Classification of logical plans.
mod plan;

use std::sync::{Arc, LazyLock};

use datafusion_common::{tree_node::TreeNodeRecursion, Result};
use datafusion_expr::{Expr, LogicalPlan};

use crate::EligibilityConfig;

pub use operator::{FunctionRegistryCatalog, OperatorCatalog, OperatorDescriptor};
pub use verdict::Verdict;

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Classifies operators, expressions and plans into [`Verdict`]s.
///
/// Functions found in an [`Expr`] are described by the configured [`OperatorCatalog`] if it has
/// an entry for them, and by their own declared [`Volatility`](datafusion_expr::Volatility) otherwise.
///
/// Input trees must be finite, acyclic and fully constructed. A classifier holds no mutable state,
/// so one instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: EligibilityConfig,
    catalog: Option<Arc<dyn OperatorCatalog>>,
}

impl Classifier {
    /// Create a classifier with the given configuration and no catalog.
    pub fn new(config: EligibilityConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    /// Consult `catalog` before a function's declared volatility.
    pub fn with_catalog(mut self, catalog: Arc<dyn OperatorCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// The configuration used by this classifier.
    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    /// Classify a single operator, ignoring its arguments.
    pub fn classify_operator(&self, op: &OperatorDescriptor) -> Verdict {
        operator::classify_descriptor(op, &self.config)
    }

    /// Classify an operator known only by name.
    ///
    /// Names missing from the catalog are treated as [`OperatorDescriptor::unknown`],
    /// which denies everything unless an exemption or the allow-list applies.
    pub fn classify_function(&self, name: &str) -> Verdict {
        let op = self.describe(name).unwrap_or_else(|| {
            log::trace!("no catalog entry for '{name}', assuming the worst");
            OperatorDescriptor::unknown(name)
        });

        self.classify_operator(&op)
    }

    fn describe(&self, name: &str) -> Option<OperatorDescriptor> {
        self.catalog.as_ref().and_then(|catalog| catalog.describe(name))
    }
}

/// Classify a single operator with the default configuration.
pub fn classify_operator(op: &OperatorDescriptor) -> Verdict {
    DEFAULT_CLASSIFIER.classify_operator(op)
}

/// Classify an expression tree with the default configuration.
pub fn classify_expr(expr: &Expr) -> Result<Verdict> {
    DEFAULT_CLASSIFIER.classify_expr(expr)
}

/// Classify a logical plan with the default configuration.
/// See [`Classifier::classify_plan`] for which plans are suitable.
pub fn classify_plan(plan: &LogicalPlan) -> Result<Verdict> {
    DEFAULT_CLASSIFIER.classify_plan(plan)
}

/// Nothing can loosen a fully restricted verdict, so traversal stops there.
fn recursion_for(verdict: &Verdict) -> TreeNodeRecursion {
    if verdict.is_fully_restricted() {
        TreeNodeRecursion::Stop
    } else {
        TreeNodeRecursion::Continue
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use datafusion::prelude::SessionContext;

    use crate::EligibilityConfig;

    use super::{classify_operator, Classifier, FunctionRegistryCatalog, OperatorDescriptor};

    #[test]
    fn test_classify_function_unknown_is_conservative() {
        let classifier = Classifier::default();
        assert!(classifier.classify_function("no_such_function").is_fully_restricted());

        // exemptions and the allow-list still apply to names without a catalog entry
        assert!(classifier.classify_function("flatten").is_permissive());
        let verdict = classifier.classify_function("now");
        assert!(verdict.is_reflection_matchable());
        assert!(!verdict.is_plan_cacheable());
        assert!(!verdict.is_reflection_incremental_refreshable());
    }

    #[test]
    fn test_classify_function_with_registry() {
        let ctx = SessionContext::new();
        let classifier = Classifier::new(EligibilityConfig::default())
            .with_catalog(Arc::new(FunctionRegistryCatalog::new(ctx.state())));

        assert!(classifier.classify_function("upper").is_permissive());
        assert!(classifier.classify_function("UPPER").is_permissive());

        let random = classifier.classify_function("random");
        assert!(!random.is_plan_cacheable());
        assert!(random.is_reflection_matchable());
        assert!(random.is_reflection_incremental_refreshable());

        assert!(classifier.classify_function("no_such_function").is_fully_restricted());
    }

    #[test]
    fn test_default_classify_operator() {
        let verdict = classify_operator(&OperatorDescriptor::new("current_user", true, true));
        assert!(verdict.is_fully_restricted());
    }
}
