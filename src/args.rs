use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ArgsBuilder {
    positions: Vec<(usize, String)>,
}

impl ArgsBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(mut self, pos: usize, name: &str) -> Self {
        self.positions.push((pos, name.into()));
        self
    }

    pub(crate) fn build(self, args: &[String]) -> Args {
        let mut map: HashMap<String, String> = HashMap::new();

        for (pos, name) in self.positions {
            if let Some(value) = args.get(pos) {
                map.insert(name, value.into());
            }
        }

        Args(map)
    }
}

#[derive(Debug)]
pub(crate) struct Args(HashMap<String, String>);

impl Args {
    pub(crate) fn builder() -> ArgsBuilder {
        ArgsBuilder::new()
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|v| v.into())
    }
}
