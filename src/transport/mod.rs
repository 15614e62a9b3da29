pub mod vendor_client;
