mod args;
use args::LoopArgs;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::{Block, Error, Expr, ItemFn, ReturnType, Token, parse_macro_input};

/// Runs an `async fn main` on a fresh loop.
///
/// ```rust,ignore
/// #[spindle::main(idle = "park")]
/// async fn main() {
///     spindle::time::sleep(std::time::Duration::from_millis(10)).await;
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as LoopArgs);
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    if sig.asyncness.is_none() {
        return Error::new_spanned(
            sig.fn_token,
            "#[spindle::main] must be used on an async function",
        )
        .to_compile_error()
        .into();
    }

    if sig.ident != "main" {
        return Error::new_spanned(&sig.ident, "#[spindle::main] must be used on fn main")
            .to_compile_error()
            .into();
    }

    let output = &sig.output;
    let builder = args.builder();
    let body = typed_body(output, block);

    quote! {
        #(#attrs)*
        #vis fn main() #output {
            let mut event_loop = #builder;
            #body

            event_loop.run_task(body).expect("main task did not complete")
        }
    }
    .into()
}

/// Runs an `async fn` test on a fresh loop.
///
/// ```rust,ignore
/// #[spindle::test]
/// async fn yields() {
///     spindle::yield_now().await;
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as LoopArgs);
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;

    if sig.asyncness.is_none() {
        return Error::new_spanned(
            sig.fn_token,
            "#[spindle::test] must be used on an async function",
        )
        .to_compile_error()
        .into();
    }

    if !sig.inputs.is_empty() {
        return Error::new_spanned(&sig.inputs, "#[spindle::test] functions take no arguments")
            .to_compile_error()
            .into();
    }

    let name = &sig.ident;
    let output = &sig.output;
    let builder = args.builder();
    let body = typed_body(output, block);

    quote! {
        #[::core::prelude::v1::test]
        #(#attrs)*
        #vis fn #name() #output {
            let mut event_loop = #builder;
            #body

            event_loop.run_task(body).expect("test task did not complete")
        }
    }
    .into()
}

/// Binds the function body as a boxed future whose output is the declared
/// return type, so `?` inside the body knows what to convert into.
fn typed_body(output: &ReturnType, block: &Block) -> proc_macro2::TokenStream {
    let output_type = match output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    quote! {
        let body: ::std::pin::Pin<
            ::std::boxed::Box<dyn ::std::future::Future<Output = #output_type>>,
        > = ::std::boxed::Box::pin(async move #block);
    }
}

/// Runs several futures concurrently on the current loop and waits for
/// all of them, returning their outputs.
///
/// Each future becomes its own task; outputs may have different types.
/// A single future yields its output directly, several yield a tuple.
/// Must be used inside an async context running on a loop.
///
/// ```rust,ignore
/// let (a, b) = spindle::gather!(async { 1 }, async { "two" });
/// ```
#[proc_macro]
pub fn gather(input: TokenStream) -> TokenStream {
    let futures = parse_macro_input!(input with Punctuated::<Expr, Token![,]>::parse_terminated);

    if futures.is_empty() {
        return quote! { () }.into();
    }

    let count = futures.len();

    let futs: Vec<_> = (0..count).map(|i| format_ident!("__spindle_fut{}", i)).collect();
    let slots: Vec<_> = (0..count).map(|i| format_ident!("__spindle_slot{}", i)).collect();
    let exprs = futures.iter();

    let outputs = slots.iter().map(|slot| {
        quote! {
            #slot
                .borrow_mut()
                .take()
                .expect("gathered task did not complete")
        }
    });

    let result = if count == 1 {
        quote! { #(#outputs)* }
    } else {
        quote! { ( #(#outputs),* ) }
    };

    quote! {{
        #(
            let #futs = #exprs;
            let #slots = ::std::rc::Rc::new(::std::cell::RefCell::new(::core::option::Option::None));
        )*

        let __spindle_members: ::std::vec::Vec<
            ::std::pin::Pin<::std::boxed::Box<dyn ::std::future::Future<Output = ()>>>,
        > = ::std::vec![
            #({
                let #slots = #slots.clone();
                ::std::boxed::Box::pin(async move {
                    let value = #futs.await;
                    *#slots.borrow_mut() = ::core::option::Option::Some(value);
                }) as ::std::pin::Pin<::std::boxed::Box<dyn ::std::future::Future<Output = ()>>>
            }),*
        ];

        ::spindle::gather(__spindle_members).await;

        #result
    }}
    .into()
}
