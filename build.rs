fn main() {
    // ESP-IDF environment setup applies to target builds only; host builds
    // (the test suite) skip it.
    let target = std::env::var("TARGET").unwrap_or_default();
    if target.contains("espidf") {
        embuild::espidf::sysenv::output();
    }
}
