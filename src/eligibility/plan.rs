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

use datafusion::execution::session_state::SessionState;
use datafusion_common::{
    tree_node::{TreeNode, TreeNodeRecursion},
    Result,
};
use datafusion_expr::LogicalPlan;

use super::{recursion_for, Classifier, Verdict};

impl Classifier {
    /// Classify every expression attached to every node of `plan`:
    /// filters, projections, join conditions, aggregates, sort keys, pushed-down scan filters
    /// and the expressions of extension nodes.
    ///
    /// `plan` should not have been optimized. DataFusion's expression simplifier replaces calls
    /// such as `now()` with the literal value they return when the plan is optimized, which
    /// erases exactly the calls this classification looks for.
    pub fn classify_plan(&self, plan: &LogicalPlan) -> Result<Verdict> {
        let mut verdict = Verdict::permissive();

        let stopped_early = self.fold_plan(plan, &mut verdict)? == TreeNodeRecursion::Stop;

        log::debug!("classified plan: {verdict:?} (stopped early: {stopped_early})");
        Ok(verdict)
    }

    /// Plan `sql` against `state` without optimizing it, then classify the plan.
    pub async fn classify_sql(&self, state: &SessionState, sql: &str) -> Result<Verdict> {
        let plan = state.create_logical_plan(sql).await?;
        self.classify_plan(&plan)
    }

    /// AND every expression in `plan` into `verdict`, stopping once it is fully restricted.
    pub(super) fn fold_plan(
        &self,
        plan: &LogicalPlan,
        verdict: &mut Verdict,
    ) -> Result<TreeNodeRecursion> {
        if verdict.is_fully_restricted() {
            return Ok(TreeNodeRecursion::Stop);
        }

        plan.apply(|node| {
            node.apply_expressions(|expr| self.fold_expr(expr, &mut *verdict))?;
            Ok(recursion_for(verdict))
        })
    }
}
