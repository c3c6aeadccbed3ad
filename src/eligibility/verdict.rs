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

use std::ops::{BitAnd, BitAndAssign};

/// Eligibility of an expression or plan for plan caching and materialized view use.
///
/// The three fields are independent. Each starts out permissive and can only be
/// denied, never granted back, so folding verdicts together is a plain AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Verdict {
    plan_cacheable: bool,
    reflection_matchable: bool,
    reflection_incremental_refreshable: bool,
}

impl Default for Verdict {
    fn default() -> Self {
        Self::permissive()
    }
}

impl Verdict {
    /// A verdict allowing everything.
    pub const fn permissive() -> Self {
        Self {
            plan_cacheable: true,
            reflection_matchable: true,
            reflection_incremental_refreshable: true,
        }
    }

    /// A verdict denying everything.
    pub const fn restricted() -> Self {
        Self {
            plan_cacheable: false,
            reflection_matchable: false,
            reflection_incremental_refreshable: false,
        }
    }

    /// Whether the plan may be cached and reused across executions.
    pub fn is_plan_cacheable(&self) -> bool {
        self.plan_cacheable
    }

    /// Whether a materialized view built from this query may be substituted for it.
    pub fn is_reflection_matchable(&self) -> bool {
        self.reflection_matchable
    }

    /// Whether a materialized view built from this query may be refreshed incrementally.
    pub fn is_reflection_incremental_refreshable(&self) -> bool {
        self.reflection_incremental_refreshable
    }

    /// Mark the plan as not cacheable.
    pub fn deny_plan_cache(&mut self) {
        self.plan_cacheable = false;
    }

    /// Mark the query as not matchable against materialized views.
    pub fn deny_reflection_matching(&mut self) {
        self.reflection_matchable = false;
    }

    /// Mark materialized views over this query as requiring full refreshes.
    pub fn deny_incremental_refresh(&mut self) {
        self.reflection_incremental_refreshable = false;
    }

    /// True once every field is denied. No further fold can change such a verdict.
    pub fn is_fully_restricted(&self) -> bool {
        !(self.plan_cacheable || self.reflection_matchable || self.reflection_incremental_refreshable)
    }

    /// True if nothing has been denied.
    pub fn is_permissive(&self) -> bool {
        *self == Self::permissive()
    }
}

impl BitAnd for Verdict {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self {
            plan_cacheable: self.plan_cacheable && rhs.plan_cacheable,
            reflection_matchable: self.reflection_matchable && rhs.reflection_matchable,
            reflection_incremental_refreshable: self.reflection_incremental_refreshable
                && rhs.reflection_incremental_refreshable,
        }
    }
}

impl BitAndAssign for Verdict {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = *self & rhs;
    }
}

/// The classifier's walkers fold in place and stop through [`TreeNodeRecursion::Stop`]
/// instead; this is for verdicts gathered by callers.
///
/// [`TreeNodeRecursion::Stop`]: datafusion_common::tree_node::TreeNodeRecursion::Stop
impl FromIterator<Verdict> for Verdict {
    /// AND-fold starting from [`Verdict::permissive`]. Stops consuming the iterator
    /// as soon as the result is fully restricted.
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        let mut result = Self::permissive();
        for verdict in iter {
            result &= verdict;
            if result.is_fully_restricted() {
                break;
            }
        }
        result
    }
}
