use framebus_macros::Payload;

#[derive(Payload)]
#[allow(dead_code)]
union Bits {
    raw: u32,
}

fn main() {
    let _ = Bits { raw: 1 };
}
