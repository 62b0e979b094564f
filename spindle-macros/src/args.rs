use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ExprLit, Lit, MetaNameValue, Token};

/// Arguments accepted by `#[spindle::main]` and `#[spindle::test]`.
///
/// ```text
/// #[spindle::main(idle = "park")]
/// ```
#[derive(Default)]
pub(crate) struct LoopArgs {
    /// Idle strategy name, validated at expansion time.
    idle: Option<String>,
}

impl Parse for LoopArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = LoopArgs::default();

        let pairs = Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)?;

        for pair in pairs {
            let value = match &pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.value(),
                other => return Err(Error::new_spanned(other, "expected a string literal")),
            };

            if pair.path.is_ident("idle") {
                match value.as_str() {
                    "spin" | "park" => args.idle = Some(value),
                    _ => {
                        return Err(Error::new_spanned(
                            &pair.value,
                            "idle must be \"spin\" or \"park\"",
                        ));
                    }
                }
            } else {
                return Err(Error::new_spanned(&pair.path, "unknown argument, expected `idle`"));
            }
        }

        Ok(args)
    }
}

impl LoopArgs {
    /// Expands to an expression building the configured loop.
    pub(crate) fn builder(&self) -> TokenStream {
        let idle = match self.idle.as_deref() {
            Some("park") => quote! { ::spindle::IdleStrategy::Park },
            _ => quote! { ::spindle::IdleStrategy::Spin },
        };

        quote! {
            ::spindle::LoopBuilder::new().idle(#idle).build()
        }
    }
}
