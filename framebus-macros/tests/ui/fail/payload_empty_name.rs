use framebus_macros::Payload;

#[derive(Payload)]
#[payload(name = "")]
struct Nameless;

fn main() {
    let _ = Nameless;
}
