fn main() {
    // Host builds (tests, simulation) do not pull in the ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
