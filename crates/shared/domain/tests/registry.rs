use gantry_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::{Any, TypeId};

#[derive(Debug)]
struct Reports {
    pages: usize,
}

impl FeatureSlice for Reports {
    fn name(&self) -> &'static str {
        "Reports"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn initialized_slice_keeps_type_and_name() {
    let slice = InitializedSlice::new(Reports { pages: 3 });

    assert_eq!(slice.id, TypeId::of::<Reports>());
    assert_eq!(slice.name, "Reports");
    assert_eq!(slice.downcast_ref::<Reports>().map(|r| r.pages), Some(3));
}
