pub struct KvsGetArgs {
    pub key: String,
}

pub struct KvsSetArgs {
    pub key: String,
    pub value: String,
}
