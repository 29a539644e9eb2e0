// Open a plain or gzip/bgzip compressed file and pass the buffered reader to the parser
macro_rules! read_compressed {
    ($file: expr, $function: expr $(, $param: expr )* ) => {{
        let file: &std::path::Path = $file.as_ref();
        let reader = std::io::BufReader::new(std::fs::File::open(file)?);

        match file.extension().and_then(std::ffi::OsStr::to_str) {
            Some("gz") => {
                let reader = std::io::BufReader::new(flate2::bufread::MultiGzDecoder::new(reader));
                $function(reader $(, $param)*)
            }
            Some(_) | None => $function(reader $(, $param)*),
        }
    }};
}

pub(crate) use read_compressed;
