pub mod http_checkout_gateway;
