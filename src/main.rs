fn main() {
    mchost_lib::run()
}
