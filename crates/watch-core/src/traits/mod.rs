//! Repository traits (ports)

mod repositories;

pub use repositories::{
    MemberRepository, RateLimitStore, RepoResult, RoomRepository, SampleRepository,
};
