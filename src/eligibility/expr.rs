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

use datafusion_common::{
    tree_node::{TreeNode, TreeNodeRecursion},
    Result,
};
use datafusion_expr::{
    expr::{AggregateFunction, Exists, InSubquery, ScalarFunction},
    Expr, WindowFunctionDefinition,
};

use super::{recursion_for, Classifier, OperatorDescriptor, Verdict};

impl Classifier {
    /// Classify every function call in `expr`, including calls nested in the arguments of
    /// other calls and inside subqueries.
    pub fn classify_expr(&self, expr: &Expr) -> Result<Verdict> {
        let mut verdict = Verdict::permissive();
        self.fold_expr(expr, &mut verdict)?;
        Ok(verdict)
    }

    /// AND every call in `expr` into `verdict`, stopping once it is fully restricted.
    pub(super) fn fold_expr(
        &self,
        expr: &Expr,
        verdict: &mut Verdict,
    ) -> Result<TreeNodeRecursion> {
        if verdict.is_fully_restricted() {
            return Ok(TreeNodeRecursion::Stop);
        }

        expr.apply(|node| {
            match node {
                // `Expr::apply` does not descend into subquery plans
                Expr::ScalarSubquery(subquery)
                | Expr::Exists(Exists { subquery, .. })
                | Expr::InSubquery(InSubquery { subquery, .. }) => {
                    self.fold_plan(&subquery.subquery, &mut *verdict)?;
                }
                _ => {
                    if let Some(op) = self.resolve(node) {
                        *verdict &= self.classify_operator(&op);
                    }
                }
            }

            Ok(recursion_for(verdict))
        })
    }

    /// Describe the function invoked at the root of `expr`, if any.
    /// Built-in operators such as arithmetic, comparisons and casts are immutable
    /// and never restrict a verdict, so they are not described.
    fn resolve(&self, expr: &Expr) -> Option<OperatorDescriptor> {
        let (name, volatility) = match expr {
            Expr::ScalarFunction(ScalarFunction { func, .. }) => {
                (func.name(), func.signature().volatility)
            }
            Expr::AggregateFunction(AggregateFunction { func, .. }) => {
                (func.name(), func.signature().volatility)
            }
            Expr::WindowFunction(window) => match &window.fun {
                WindowFunctionDefinition::AggregateUDF(udaf) => {
                    (udaf.name(), udaf.signature().volatility)
                }
                WindowFunctionDefinition::WindowUDF(udwf) => {
                    (udwf.name(), udwf.signature().volatility)
                }
            },
            _ => return None,
        };

        Some(
            self.describe(name)
                .unwrap_or_else(|| OperatorDescriptor::from_volatility(name, volatility)),
        )
    }
}
