use crate::domain::model::{Bounds, Place};

impl Bounds {
    /// 累計所有地點的最小/最大經緯度。空序列回傳 `None`。
    /// 座標不是有限數值的地點不列入計算。
    pub fn enclosing<'a, I>(places: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Place>,
    {
        places
            .into_iter()
            .filter(|place| place.position.lat.is_finite() && place.position.lng.is_finite())
            .fold(None, |acc, place| {
                let p = place.position;
                Some(match acc {
                    None => Bounds::from_point(p),
                    Some(b) => Bounds {
                        south: b.south.min(p.lat),
                        west: b.west.min(p.lng),
                        north: b.north.max(p.lat),
                        east: b.east.max(p.lng),
                    },
                })
            })
    }
}
