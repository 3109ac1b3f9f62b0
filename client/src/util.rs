pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

fn random_u32() -> u32 {
    (js_sys::Math::random() * (u32::MAX as f64 + 1.0)) as u32
}

pub fn make_id() -> String {
    format!("stroke_{:x}_{:08x}", now_ms(), random_u32())
}
