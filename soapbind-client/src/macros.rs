//! Macros for argument lists and typed service wrappers

/// Build [`Arguments`](crate::Arguments) with keyed or positional values
///
/// # Example
///
/// ```rust
/// use soapbind_client::soap_args;
/// let keyed = soap_args! { "name" => "Computer", "quantity" => 2 };
/// let positional = soap_args!["IBM", 2];
/// assert_eq!(keyed.len(), 2);
/// assert_eq!(positional.len(), 2);
/// ```
#[macro_export]
macro_rules! soap_args {
    () => {
        $crate::Arguments::new()
    };
    ($($key:literal => $value:expr),+ $(,)?) => {{
        let mut arguments = $crate::Arguments::new();
        $(
            arguments.insert($key, $crate::__private::serde_json::json!($value));
        )+
        arguments
    }};
    ($($value:expr),+ $(,)?) => {{
        let mut arguments = $crate::Arguments::new();
        $(
            arguments.push($crate::__private::serde_json::json!($value));
        )+
        arguments
    }};
}

/// Generate a typed wrapper around [`SoapHttpClient`](crate::SoapHttpClient) with one
/// method per operation
///
/// # Example
///
/// ```rust
/// use soapbind_client::soap_service;
/// soap_service! {
///     /// Stock quote service
///     pub struct StockQuote {
///         fn get_stock_price => "getStockPrice";
///         fn get_last_trade => "GetLastTradePrice";
///     }
/// }
/// ```
#[macro_export]
macro_rules! soap_service {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$op_meta:meta])*
                fn $method:ident => $operation:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            client: $crate::SoapHttpClient,
        }

        impl $name {
            $vis fn new(client: $crate::SoapHttpClient) -> Self {
                Self { client }
            }

            $vis fn client(&self) -> &$crate::SoapHttpClient {
                &self.client
            }

            $(
                $(#[$op_meta])*
                $vis fn $method(
                    &self,
                    arguments: impl ::std::convert::Into<$crate::Arguments>,
                ) -> $crate::SoapFuture {
                    self.client.call($operation, arguments)
                }
            )*
        }
    };
}
