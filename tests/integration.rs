#[path = "integration/common.rs"]
mod common;
#[path = "integration/caching.rs"]
mod caching;
#[path = "integration/hooks.rs"]
mod hooks;
#[path = "integration/includes.rs"]
mod includes;
#[path = "integration/rendering.rs"]
mod rendering;
