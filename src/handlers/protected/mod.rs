// handlers/protected/mod.rs - endpoints behind the JWT middleware (/api/*)
//
// The middleware injects `Principal` and `BearerToken` into request
// extensions before any handler here runs.

pub mod products;
pub mod session;
