//! `#[controller]` attribute for `controller_routes`.
//!
//! Placed on an inherent `impl` block, it strips the route attributes from
//! the methods and generates the `Controller` impl that replays them. Method
//! attributes run bottom-up: the one nearest the `fn` is applied first.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    Attribute, Expr, FnArg, Ident, ImplItem, ItemImpl, LitStr, Result as SynResult, Token,
};

const VERB_ATTRS: &[&str] = &["get", "post", "put", "patch", "delete", "options", "all"];
const CONFIG_ATTRS: &[&str] = &["route", "auth", "payload", "validate", "option"];

/// `key = value`
struct KeyValue {
    key: Ident,
    value: Expr,
}

impl Parse for KeyValue {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Expr = input.parse()?;
        Ok(KeyValue { key, value })
    }
}

fn peek_key_value(input: ParseStream) -> bool {
    input.peek(Ident) && input.peek2(Token![=]) && !input.peek2(Token![==])
}

/// Arguments of `#[controller(...)]`
#[derive(Default)]
struct ControllerArgs {
    base_path: Option<Expr>,
    auth: Option<Expr>,
    extends: Option<Ident>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut args = ControllerArgs::default();
        while !input.is_empty() {
            if input.peek(LitStr) {
                let lit: LitStr = input.parse()?;
                args.base_path = Some(Expr::Lit(syn::ExprLit {
                    attrs: Vec::new(),
                    lit: syn::Lit::Str(lit),
                }));
            } else {
                let kv: KeyValue = input.parse()?;
                match kv.key.to_string().as_str() {
                    "path" => args.base_path = Some(kv.value),
                    "auth" => args.auth = Some(kv.value),
                    "extends" => match kv.value {
                        Expr::Path(p) if p.path.get_ident().is_some() => {
                            args.extends = p.path.get_ident().cloned();
                        }
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "extends expects the name of the field holding the parent",
                            ))
                        }
                    },
                    other => {
                        return Err(syn::Error::new(
                            kv.key.span(),
                            format!("unexpected controller argument {}", other),
                        ))
                    }
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

/// `#[get(path)]`, `#[get(path, overrides)]`
struct VerbArgs {
    path: Expr,
    overrides: Option<Expr>,
}

impl Parse for VerbArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let path: Expr = input.parse()?;
        let overrides = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                None
            } else {
                Some(input.parse()?)
            }
        } else {
            None
        };
        Ok(VerbArgs { path, overrides })
    }
}

/// `#[route(VERB, path)]`, `#[route(VERB, path, overrides)]`
struct RouteArgs {
    verb: TokenStream2,
    args: VerbArgs,
}

impl Parse for RouteArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let span = input.span();
        let name = if input.peek(LitStr) {
            input.parse::<LitStr>()?.value()
        } else if input.peek(Token![*]) {
            input.parse::<Token![*]>()?;
            "*".to_string()
        } else {
            input.parse::<Ident>()?.to_string()
        };
        input.parse::<Token![,]>()?;
        let args: VerbArgs = input.parse()?;
        Ok(RouteArgs {
            verb: verb_tokens(&name, span)?,
            args,
        })
    }
}

fn verb_tokens(name: &str, span: Span) -> SynResult<TokenStream2> {
    let upper = name.trim().to_ascii_uppercase();
    match upper.as_str() {
        "*" | "ANY" | "ALL" => Ok(quote! { ::controller_routes::RouteVerb::Any }),
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "OPTIONS" | "HEAD" | "TRACE" | "CONNECT" => {
            let ident = Ident::new(&upper, span);
            Ok(quote! {
                ::controller_routes::RouteVerb::Method(::controller_routes::__private::http::Method::#ident)
            })
        }
        _ => Err(syn::Error::new(span, format!("unsupported HTTP verb {}", name))),
    }
}

/// `name(k = v, ..)` or `name(expr)`
enum Fragment {
    Pairs(Vec<KeyValue>),
    Expr(Expr),
}

impl Parse for Fragment {
    fn parse(input: ParseStream) -> SynResult<Self> {
        if peek_key_value(input) {
            let pairs = Punctuated::<KeyValue, Token![,]>::parse_terminated(input)?;
            Ok(Fragment::Pairs(pairs.into_iter().collect()))
        } else {
            Ok(Fragment::Expr(input.parse()?))
        }
    }
}

fn json_pairs(ty: TokenStream2, pairs: &[KeyValue]) -> TokenStream2 {
    let withs = pairs.iter().map(|KeyValue { key, value }| {
        let key = key.to_string();
        quote! { .with(#key, ::controller_routes::__private::serde_json::json!(#value)) }
    });
    quote! { #ty::new() #(#withs)* }
}

/// `marker` written bare or as a string literal
fn is_marker(expr: &Expr, marker: &str) -> bool {
    match expr {
        Expr::Path(p) => p.path.is_ident(marker),
        Expr::Lit(lit) => matches!(&lit.lit, syn::Lit::Str(s) if s.value() == marker),
        _ => false,
    }
}

fn attr_name(attr: &Attribute) -> Option<String> {
    let ident = attr.path().get_ident()?.to_string();
    if VERB_ATTRS.contains(&ident.as_str()) || CONFIG_ATTRS.contains(&ident.as_str()) {
        Some(ident)
    } else {
        None
    }
}

/// One chained call on the method builder
fn method_call(name: &str, attr: &Attribute) -> SynResult<TokenStream2> {
    match name {
        "route" => {
            let RouteArgs { verb, args } = attr.parse_args()?;
            Ok(verb_call(verb, args))
        }
        "auth" => {
            let expr: Expr = attr.parse_args()?;
            Ok(quote! { .auth(#expr) })
        }
        "payload" => match attr.parse_args::<Fragment>()? {
            Fragment::Expr(expr) if is_marker(&expr, "multipart") => {
                Ok(quote! { .payload(::controller_routes::PayloadSpec::Multipart) })
            }
            // Any other string is not a payload shape; it is dropped at run time.
            Fragment::Expr(Expr::Lit(lit)) if matches!(lit.lit, syn::Lit::Str(_)) => Ok(quote! {
                .payload_value(&::controller_routes::__private::serde_json::Value::from(#lit))
            }),
            Fragment::Expr(expr) => Ok(quote! { .payload(#expr) }),
            Fragment::Pairs(pairs) => {
                let options = json_pairs(quote! { ::controller_routes::PayloadOptions }, &pairs);
                Ok(quote! { .payload(#options) })
            }
        },
        "validate" => match attr.parse_args::<Fragment>()? {
            Fragment::Expr(expr) => Ok(quote! { .validate(#expr) }),
            Fragment::Pairs(pairs) => {
                let options = json_pairs(quote! { ::controller_routes::ValidateOptions }, &pairs);
                Ok(quote! { .validate(#options) })
            }
        },
        "option" => {
            let pairs = attr.parse_args_with(Punctuated::<KeyValue, Token![,]>::parse_terminated)?;
            let calls = pairs.iter().map(|KeyValue { key, value }| {
                let key = key.to_string();
                quote! { .option(#key, ::controller_routes::__private::serde_json::json!(#value)) }
            });
            Ok(quote! { #(#calls)* })
        }
        verb => {
            let args: VerbArgs = attr.parse_args()?;
            let verb = verb_tokens(verb, attr.path().segments[0].ident.span())?;
            Ok(verb_call(verb, args))
        }
    }
}

fn verb_call(verb: TokenStream2, VerbArgs { path, overrides }: VerbArgs) -> TokenStream2 {
    match overrides {
        Some(overrides) => quote! { .route_with(#verb, #path, #overrides) },
        None => quote! { .route(#verb, #path) },
    }
}

#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let mut input = parse_macro_input!(item as ItemImpl);
    match expand(args, &mut input) {
        Ok(tokens) => tokens.into(),
        Err(err) => {
            let mut tokens = input.into_token_stream();
            tokens.extend(err.to_compile_error());
            tokens.into()
        }
    }
}

fn expand(args: ControllerArgs, input: &mut ItemImpl) -> SynResult<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] goes on an inherent impl block",
        ));
    }

    let mut methods = Vec::new();
    let mut errors: Option<syn::Error> = None;
    let mut report = |err: syn::Error| match errors.as_mut() {
        Some(errors) => errors.combine(err),
        None => errors = Some(err),
    };
    // Every method is stripped before any error is returned, so the emitted
    // impl carries no unknown attributes.
    for item in &mut input.items {
        let ImplItem::Fn(func) = item else { continue };

        let mut calls = Vec::new();
        let mut failed = false;
        let mut kept = Vec::with_capacity(func.attrs.len());
        for attr in func.attrs.drain(..) {
            match attr_name(&attr) {
                Some(name) => match method_call(&name, &attr) {
                    Ok(call) => calls.push(call),
                    Err(err) => {
                        failed = true;
                        report(err);
                    }
                },
                None => kept.push(attr),
            }
        }
        func.attrs = kept;
        if calls.is_empty() || failed {
            continue;
        }
        if !matches!(func.sig.inputs.first(), Some(FnArg::Receiver(_))) {
            report(syn::Error::new_spanned(
                &func.sig,
                "route methods take &self and a HandlerRequest",
            ));
            continue;
        }

        // Nearest attribute first.
        calls.reverse();
        let ident = &func.sig.ident;
        let name = ident.to_string();
        methods.push(quote! {
            __def.method(#name, Self::#ident) #(#calls)*;
        });
    }

    if let Some(errors) = errors {
        return Err(errors);
    }

    let base_path = args
        .base_path
        .map(|path| quote! { __def.base_path(#path)?; });
    let auth = args.auth.map(|auth| quote! { __def.default_auth(#auth); });
    let extends = args
        .extends
        .map(|field| quote! { __def.extends(|this: &Self| &this.#field)?; });

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::controller_routes::Controller for #self_ty #where_clause {
            fn declare(
                __def: &mut ::controller_routes::ControllerDef<'_, Self>,
            ) -> ::core::result::Result<(), ::controller_routes::MetadataError> {
                #base_path
                #auth
                #extends
                #(#methods)*
                ::core::result::Result::Ok(())
            }
        }
    })
}
