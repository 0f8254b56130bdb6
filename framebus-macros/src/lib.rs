use proc_macro::TokenStream;

mod payload;

/// 载荷派生宏
/// - 为目标类型实现 `::framebus_core::Payload`（`payload_name`）
/// - 默认名称为类型标识符本身，例如 `struct Ping;` -> `"Ping"`
/// - 支持参数：`#[payload(name = "...")]` 覆写名称
/// - 支持具名/tuple/unit 结构体与枚举，泛型参数需自行满足 `'static + Send + Sync`
#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    payload::expand(input)
}
