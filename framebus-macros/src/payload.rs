use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Data, DeriveInput, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[derive(Payload)] 宏实现
pub(crate) fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if let Data::Union(u) = &input.data {
        return syn::Error::new(
            u.union_token.span(),
            "#[derive(Payload)] only supports struct or enum",
        )
        .to_compile_error()
        .into();
    }

    let cfg = match PayloadAttrConfig::from_attrs(&input.attrs) {
        Ok(cfg) => cfg,
        Err(err) => return err.to_compile_error().into(),
    };

    let ident = &input.ident;
    let name = cfg
        .name
        .unwrap_or_else(|| syn::LitStr::new(&ident.to_string(), ident.span()));
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::framebus_core::Payload for #ident #ty_generics #where_clause {
            fn payload_name(&self) -> &'static str {
                #name
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct PayloadAttrConfig {
    name: Option<syn::LitStr>,
}

impl PayloadAttrConfig {
    // 合并所有 #[payload(...)]，同一个键只允许出现一次
    fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut name: Option<syn::LitStr> = None;

        for attr in attrs.iter().filter(|a| a.path().is_ident("payload")) {
            let elems = attr.parse_args_with(
                Punctuated::<PayloadAttrElem, Token![,]>::parse_terminated,
            )?;
            for elem in elems {
                match elem {
                    PayloadAttrElem::Name(lit) => {
                        if name.is_some() {
                            return Err(syn::Error::new(
                                lit.span(),
                                "duplicate key 'name' in attribute",
                            ));
                        }
                        if lit.value().is_empty() {
                            return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                        }
                        name = Some(lit);
                    }
                }
            }
        }

        Ok(Self { name })
    }
}

enum PayloadAttrElem {
    Name(syn::LitStr),
}

impl Parse for PayloadAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        if key == "name" {
            let _eq: Token![=] = input.parse()?;
            let expr: syn::Expr = input.parse()?;
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Ok(Self::Name(s)),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'name'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name'",
            ))
        }
    }
}
