use txfuzz_core::account::create_accounts;

/// Prints `count` fresh `address private_key` pairs.
pub fn create(count: usize) {
    for account in create_accounts(count) {
        println!("{} {}", account.address(), account.private_key_hex());
    }
}
