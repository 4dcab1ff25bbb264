//! Column names and identifiers written by the PAC experiment runners.

/// Problem instance identifier.
pub const INSTANCE_ID: &str = "InstanceID";
/// Suboptimality bound; the join key together with the instance.
pub const EPSILON: &str = "epsilon";
/// Nodes expanded by a run.
pub const EXPANDED: &str = "Expanded";
/// Source algorithm tag added by the merge step.
pub const ALG_NAME: &str = "AlgName";
/// PAC condition class used by a Basic run.
pub const PAC_CONDITION: &str = "pacCondition";
/// DPS weight, converted to epsilon on merge.
pub const WEIGHT: &str = "weight";
/// PAC delta of a Basic run.
pub const DELTA: &str = "delta";

/// Column appended by the delta-zero baseline step.
pub const EXPANDED_FMIN: &str = "expandedFMin";

/// Condition selecting the FMin reference runs.
pub const FMIN_CONDITION: &str = "org.cs4j.core.algorithms.pac.FMinCondition";
/// Condition selecting the Oracle reference runs.
pub const ORACLE_CONDITION: &str = "org.cs4j.core.algorithms.pac.OraclePACCondition";

/// Source table names.
pub const BASIC: &str = "Basic";
pub const OPEN: &str = "Open";
pub const DPS: &str = "DPS";
pub const BOUNDED_COST: &str = "BC";

/// Name given to the table produced by the merge step.
pub const MERGED: &str = "Merged";
