use sound_paths::geometry::Point;

pub fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
