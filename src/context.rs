pub struct Context {
    pub io: crate::iostreams::IoStreams,
    pub debug: bool,
}

impl Context {
    pub fn new(debug: bool) -> Context {
        // Let's get our IO streams.
        let io = crate::iostreams::IoStreams::system();

        Context { io, debug }
    }
}
