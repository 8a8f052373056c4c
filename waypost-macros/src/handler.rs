//! The `#[handler]` attribute.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Expr, ExprLit, ExprUnary, FnArg, Ident, ItemFn, Lit, MetaNameValue, ReturnType, Token, Type,
    UnOp,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Arguments for the `#[handler]` macro, e.g. `name = "Inbox", priority = -5`.
#[derive(Default)]
pub(crate) struct HandlerArgs {
    pub name: Option<Ident>,
    pub priority: Option<i32>,
}

impl Parse for HandlerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = HandlerArgs::default();

        for pair in Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)? {
            let Some(key) = pair.path.get_ident() else {
                return Err(syn::Error::new_spanned(&pair.path, "expected `name` or `priority`"));
            };

            if key == "name" {
                if args.name.is_some() {
                    return Err(syn::Error::new_spanned(key, "`name` given twice"));
                }
                args.name = Some(parse_struct_name(&pair.value)?);
            } else if key == "priority" {
                if args.priority.is_some() {
                    return Err(syn::Error::new_spanned(key, "`priority` given twice"));
                }
                args.priority = Some(parse_priority(&pair.value)?);
            } else {
                return Err(syn::Error::new_spanned(
                    key,
                    format!("unknown handler argument `{}`", key),
                ));
            }
        }

        Ok(args)
    }
}

/// `name = "Ident"`: the string must itself be a valid identifier.
fn parse_struct_name(value: &Expr) -> syn::Result<Ident> {
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => lit.parse::<Ident>(),
        _ => Err(syn::Error::new_spanned(value, "`name` expects a string literal")),
    }
}

/// `priority = <int>`: any literal that fits an `i32`, optionally negated.
fn parse_priority(value: &Expr) -> syn::Result<i32> {
    let (negative, literal) = match value {
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => (true, &**expr),
        other => (false, other),
    };
    let Expr::Lit(ExprLit {
        lit: Lit::Int(int), ..
    }) = literal
    else {
        return Err(syn::Error::new_spanned(value, "`priority` expects an integer literal"));
    };

    let magnitude: i64 = int.base10_parse()?;
    let signed = if negative { -magnitude } else { magnitude };
    i32::try_from(signed).map_err(|_| {
        syn::Error::new_spanned(value, format!("priority {} does not fit in an `i32`", signed))
    })
}

/// Implementation of the `#[handler]` macro.
pub fn handler_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as HandlerArgs);
    let input = parse_macro_input!(item as ItemFn);

    match expand(&args, &input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: &HandlerArgs, input: &ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let sig = &input.sig;
    let fn_name = &sig.ident;
    let fn_vis = &input.vis;
    let fn_block = &input.block;
    let inputs = &sig.inputs;
    let output = &sig.output;
    let asyncness = &sig.asyncness;

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "Handler function cannot be generic",
        ));
    }
    if matches!(output, ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            sig,
            "Handler function must return `bool`",
        ));
    }

    let payload_type = match (inputs.len(), inputs.first()) {
        (1, Some(FnArg::Typed(pat_type))) => match &*pat_type.ty {
            Type::Reference(type_ref) if type_ref.mutability.is_none() => &type_ref.elem,
            _ => {
                return Err(syn::Error::new_spanned(
                    &pat_type.ty,
                    "Handler request argument must be a shared reference (&Request)",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                inputs,
                "Handler function must take exactly one argument: fn(request: &Request) -> bool",
            ));
        }
    };

    let struct_name = args.name.clone().unwrap_or_else(|| fn_name.clone());

    let priority_const = args.priority.map(|p| {
        quote! {
            /// The priority to attach this handler with. Higher values are asked first.
            pub const PRIORITY: ::waypost::Priority = ::waypost::Priority::new(#p);
        }
    });

    let answer = if asyncness.is_some() {
        quote! {
            ::waypost::Handling::pending(async move {
                ::waypost::Outcome::from_bool(Self::call(__payload).await)
            })
        }
    } else {
        quote! {
            ::waypost::Handling::ready(::waypost::Outcome::from_bool(Self::call(__payload)))
        }
    };

    Ok(quote! {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = concat!("Leaf node generated by `#[waypost::handler]` from `", stringify!(#fn_name), "`")]
        #fn_vis struct #struct_name;

        impl #struct_name {
            #priority_const

            #asyncness fn call(#inputs) #output #fn_block
        }

        impl ::waypost::Node for #struct_name {
            fn handle<'a>(
                &'a self,
                request: ::waypost::Request<'a>,
                _skip: &'a ::waypost::SkipSet,
            ) -> ::waypost::Handling<'a> {
                let ::core::option::Option::Some(__payload) = request.downcast_ref::<#payload_type>() else {
                    return ::waypost::Handling::declined();
                };
                #answer
            }

            fn label(&self) -> &str {
                stringify!(#fn_name)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(source: &str) -> syn::Result<HandlerArgs> {
        syn::parse_str::<HandlerArgs>(source)
    }

    #[test]
    fn test_empty_and_full_arguments() {
        let empty = args("").unwrap();
        assert!(empty.name.is_none() && empty.priority.is_none());

        let full = args(r#"name = "InboxHandler", priority = -250,"#).unwrap();
        assert_eq!(full.name.unwrap(), "InboxHandler");
        assert_eq!(full.priority, Some(-250));
    }

    #[test]
    fn test_priority_must_fit_in_i32() {
        assert_eq!(args("priority = -2147483648").unwrap().priority, Some(i32::MIN));
        assert!(args("priority = 2147483648").is_err());
        assert!(args("priority = \"high\"").is_err());
    }

    #[test]
    fn test_rejects_bad_names_and_unknown_keys() {
        assert!(args(r#"name = "not an ident""#).is_err());
        assert!(args("name = Inbox").is_err());
        assert!(args(r#"name = "A", name = "B""#).is_err());
        assert!(args("filter = 1").is_err());
    }
}
