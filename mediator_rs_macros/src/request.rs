use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Type};

#[derive(Clone, Copy)]
pub enum RequestContract {
    Command,
    Query,
    Notification,
}

impl RequestContract {
    fn attribute(self) -> &'static str {
        match self {
            RequestContract::Command => "command",
            RequestContract::Query => "query",
            RequestContract::Notification => "notification",
        }
    }
}

pub fn derive_request(input: TokenStream, contract: RequestContract) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input, contract) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput, contract: RequestContract) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = match contract {
        RequestContract::Command => {
            // Commands without a declared output produce `NoValue`
            let output = match extract_output(input, contract)? {
                Some(ty) => quote! { #ty },
                None => quote! { ::mediator_rs::NoValue },
            };
            quote! {
                impl #impl_generics ::mediator_rs::Command for #name #ty_generics #where_clause {
                    type Output = #output;
                }
            }
        }
        RequestContract::Query => {
            let output = extract_output(input, contract)?.ok_or_else(|| {
                syn::Error::new(
                    name.span(),
                    "Query derive: a query must declare its result with #[query(output = T)]",
                )
            })?;
            quote! {
                impl #impl_generics ::mediator_rs::Query for #name #ty_generics #where_clause {
                    type Output = #output;
                }
            }
        }
        RequestContract::Notification => quote! {
            impl #impl_generics ::mediator_rs::Notification for #name #ty_generics #where_clause {}
        },
    };

    Ok(expanded)
}

/// Reads `#[command(output = T)]` / `#[query(output = T)]`.
fn extract_output(input: &DeriveInput, contract: RequestContract) -> syn::Result<Option<Type>> {
    let mut output = None;

    for attr in &input.attrs {
        if !attr.path().is_ident(contract.attribute()) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("output") {
                let ty: Type = meta.value()?.parse()?;
                if output.replace(ty).is_some() {
                    return Err(meta.error("duplicate `output` argument"));
                }
                Ok(())
            } else {
                Err(meta.error("unsupported argument, expected `output = Type`"))
            }
        })?;
    }

    Ok(output)
}
