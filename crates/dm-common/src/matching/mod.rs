pub mod explanation;
pub mod features;
pub mod job_filter;
pub mod pipeline;
pub mod skills;

pub use explanation::{explain, Explanation};
pub use features::{
    build_feature_vector, FeatureTable, FeatureVector, JobRequirements, FEATURE_COLUMNS,
    FEATURE_COUNT,
};
pub use job_filter::{JobFilter, SapFilter};
pub use pipeline::{rank, RankingEngine, RankingResult, RankingRun};
pub use skills::{match_skills, SkillMatchResult};
