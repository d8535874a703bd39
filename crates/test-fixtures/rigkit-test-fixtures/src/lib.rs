//! In-memory host scene for exercising the channel core without a real
//! scene graph. `MemoryScene` implements the host traits over plain maps;
//! `MemoryCurve` is a deliberately small keyframe store with linear
//! evaluation, enough to observe what the core wrote.

use hashbrown::HashMap;

use rigkit_channel_core::{
    BreakFlags, ChannelError, ChannelRef, ChannelSink, ChannelSource, Curve, EndBehavior,
    Interpolation, KeyId, LinkGraph, ObjectId, Side, SideSel, SlopeKind, StorageKind,
};

const TIME_EPS: f64 = 1e-9;
const AUTO_WEIGHT: f64 = 1.0 / 3.0;

#[derive(Copy, Clone, Debug, PartialEq)]
enum StoredValue {
    Int(i64),
    Float(f64),
}

impl StoredValue {
    fn as_f64(self) -> f64 {
        match self {
            StoredValue::Int(v) => v as f64,
            StoredValue::Float(v) => v,
        }
    }
}

#[derive(Clone, Debug)]
struct MemoryKey {
    id: KeyId,
    time: f64,
    value_in: StoredValue,
    value_out: StoredValue,
    kind_in: SlopeKind,
    kind_out: SlopeKind,
    slope_in: f64,
    slope_out: f64,
    weight_in: f64,
    weight_out: f64,
    manual_weight_in: bool,
    manual_weight_out: bool,
    broken: BreakFlags,
    controlling: Side,
}

impl MemoryKey {
    fn fresh(id: KeyId, time: f64, value: StoredValue) -> Self {
        Self {
            id,
            time,
            value_in: value,
            value_out: value,
            kind_in: SlopeKind::Auto,
            kind_out: SlopeKind::Auto,
            slope_in: 0.0,
            slope_out: 0.0,
            weight_in: AUTO_WEIGHT,
            weight_out: AUTO_WEIGHT,
            manual_weight_in: false,
            manual_weight_out: false,
            broken: BreakFlags::default(),
            controlling: Side::In,
        }
    }

    fn value_on(&self, side: Side) -> StoredValue {
        match side {
            Side::In => self.value_in,
            Side::Out => self.value_out,
        }
    }

    fn kind_on(&self, side: Side) -> SlopeKind {
        match side {
            Side::In => self.kind_in,
            Side::Out => self.kind_out,
        }
    }
}

/// Keyframe store with a time-ordered key list and stable ids. Evaluation
/// is linear between the left key's out value and the right key's in
/// value; at a key's exact time the controlling side wins, which is what
/// makes broken-value write ordering observable.
#[derive(Clone, Debug)]
pub struct MemoryCurve {
    is_int: bool,
    interpolation: Interpolation,
    pre_behavior: EndBehavior,
    post_behavior: EndBehavior,
    reject_manual_weight: bool,
    next_id: u64,
    keys: Vec<MemoryKey>,
}

impl MemoryCurve {
    pub fn new(is_int: bool) -> Self {
        Self {
            is_int,
            interpolation: Interpolation::default(),
            pre_behavior: EndBehavior::default(),
            post_behavior: EndBehavior::default(),
            reject_manual_weight: true,
            next_id: 1,
            keys: Vec::new(),
        }
    }

    /// When false, stepped-slope sides accept manual weights like any other.
    pub fn set_reject_manual_weight(&mut self, reject: bool) {
        self.reject_manual_weight = reject;
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    fn pos(&self, id: KeyId) -> usize {
        self.keys
            .iter()
            .position(|k| k.id == id)
            .expect("stale key handle")
    }

    fn key(&self, id: KeyId) -> &MemoryKey {
        &self.keys[self.pos(id)]
    }

    fn key_mut(&mut self, id: KeyId) -> &mut MemoryKey {
        let at = self.pos(id);
        &mut self.keys[at]
    }

    fn coerce(&self, value: StoredValue) -> StoredValue {
        if self.is_int {
            StoredValue::Int(value.as_f64() as i64)
        } else {
            StoredValue::Float(value.as_f64())
        }
    }

    fn add(&mut self, time: f64, value: StoredValue) -> KeyId {
        let value = self.coerce(value);
        if let Some(at) = self.keys.iter().position(|k| (k.time - time).abs() <= TIME_EPS) {
            let id = self.keys[at].id;
            let time = self.keys[at].time;
            self.keys[at] = MemoryKey::fresh(id, time, value);
            return id;
        }
        let id = KeyId(self.next_id);
        self.next_id += 1;
        let at = self
            .keys
            .iter()
            .position(|k| k.time > time)
            .unwrap_or(self.keys.len());
        self.keys.insert(at, MemoryKey::fresh(id, time, value));
        id
    }

    fn set_value(&mut self, id: KeyId, value: StoredValue, sel: SideSel) {
        let value = self.coerce(value);
        let key = self.key_mut(id);
        match sel {
            SideSel::In => {
                key.value_in = value;
                key.broken.value = true;
                key.controlling = Side::In;
            }
            SideSel::Out => {
                key.value_out = value;
                key.broken.value = true;
                key.controlling = Side::Out;
            }
            SideSel::Both => {
                key.value_in = value;
                key.value_out = value;
                key.broken.value = false;
            }
        }
    }

    /// Linear evaluation at `time`, clamped outside the keyed range.
    pub fn evaluate(&self, time: f64) -> f64 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if let Some(key) = self.keys.iter().find(|k| (k.time - time).abs() <= TIME_EPS) {
            return key.value_on(key.controlling).as_f64();
        }
        if time < first.time {
            return first.value_in.as_f64();
        }
        if time > last.time {
            return last.value_out.as_f64();
        }
        let mut left = first;
        for right in &self.keys {
            if right.time > time {
                let span = right.time - left.time;
                let t = (time - left.time) / span;
                let a = left.value_out.as_f64();
                let b = right.value_in.as_f64();
                return a + (b - a) * t;
            }
            left = right;
        }
        last.value_out.as_f64()
    }
}

impl Curve for MemoryCurve {
    fn is_int(&self) -> bool {
        self.is_int
    }

    fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<(), ChannelError> {
        self.interpolation = interpolation;
        Ok(())
    }

    fn end_behavior(&self, side: Side) -> EndBehavior {
        match side {
            Side::In => self.pre_behavior,
            Side::Out => self.post_behavior,
        }
    }

    fn set_end_behavior(&mut self, behavior: EndBehavior, side: Side) -> Result<(), ChannelError> {
        match side {
            Side::In => self.pre_behavior = behavior,
            Side::Out => self.post_behavior = behavior,
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.keys.clear();
    }

    fn first(&self) -> Option<KeyId> {
        self.keys.first().map(|k| k.id)
    }

    fn last(&self) -> Option<KeyId> {
        self.keys.last().map(|k| k.id)
    }

    fn next(&self, id: KeyId) -> Option<KeyId> {
        self.keys.get(self.pos(id) + 1).map(|k| k.id)
    }

    fn previous(&self, id: KeyId) -> Option<KeyId> {
        let at = self.pos(id);
        if at == 0 {
            None
        } else {
            self.keys.get(at - 1).map(|k| k.id)
        }
    }

    fn find(&self, time: f64) -> Option<KeyId> {
        self.keys
            .iter()
            .find(|k| (k.time - time).abs() <= TIME_EPS)
            .map(|k| k.id)
    }

    fn key_time(&self, id: KeyId) -> f64 {
        self.key(id).time
    }

    fn broken(&self, id: KeyId) -> (BreakFlags, Side) {
        let key = self.key(id);
        (key.broken, key.controlling)
    }

    fn key_value_int(&self, id: KeyId, side: Side) -> Result<i64, ChannelError> {
        Ok(self.key(id).value_on(side).as_f64() as i64)
    }

    fn key_value_float(&self, id: KeyId, side: Side) -> Result<f64, ChannelError> {
        Ok(self.key(id).value_on(side).as_f64())
    }

    fn slope_kind(&self, id: KeyId, side: Side) -> Result<(SlopeKind, bool), ChannelError> {
        let key = self.key(id);
        let manual = match side {
            Side::In => key.manual_weight_in,
            Side::Out => key.manual_weight_out,
        };
        Ok((key.kind_on(side), manual))
    }

    fn slope(&self, id: KeyId, side: Side) -> Result<f64, ChannelError> {
        let key = self.key(id);
        Ok(match side {
            Side::In => key.slope_in,
            Side::Out => key.slope_out,
        })
    }

    fn weight(&self, id: KeyId, side: Side) -> Result<f64, ChannelError> {
        let key = self.key(id);
        Ok(match side {
            Side::In => key.weight_in,
            Side::Out => key.weight_out,
        })
    }

    fn add_int(&mut self, time: f64, value: i64) -> KeyId {
        self.add(time, StoredValue::Int(value))
    }

    fn add_float(&mut self, time: f64, value: f64) -> KeyId {
        self.add(time, StoredValue::Float(value))
    }

    fn set_key_value_int(
        &mut self,
        id: KeyId,
        value: i64,
        sel: SideSel,
    ) -> Result<(), ChannelError> {
        self.set_value(id, StoredValue::Int(value), sel);
        Ok(())
    }

    fn set_key_value_float(
        &mut self,
        id: KeyId,
        value: f64,
        sel: SideSel,
    ) -> Result<(), ChannelError> {
        self.set_value(id, StoredValue::Float(value), sel);
        Ok(())
    }

    fn set_slope_kind(
        &mut self,
        id: KeyId,
        kind: SlopeKind,
        sel: SideSel,
    ) -> Result<(), ChannelError> {
        let key = self.key_mut(id);
        match sel {
            SideSel::In => {
                key.kind_in = kind;
                key.broken.slope = true;
            }
            SideSel::Out => {
                key.kind_out = kind;
                key.broken.slope = true;
            }
            SideSel::Both => {
                key.kind_in = kind;
                key.kind_out = kind;
                key.broken.slope = false;
            }
        }
        Ok(())
    }

    fn set_slope(&mut self, id: KeyId, value: f64, sel: SideSel) -> Result<(), ChannelError> {
        let key = self.key_mut(id);
        match sel {
            SideSel::In => {
                key.slope_in = value;
                key.broken.slope = true;
            }
            SideSel::Out => {
                key.slope_out = value;
                key.broken.slope = true;
            }
            SideSel::Both => {
                key.slope_in = value;
                key.slope_out = value;
                key.broken.slope = false;
            }
        }
        Ok(())
    }

    fn set_weight(
        &mut self,
        id: KeyId,
        value: f64,
        reset_to_auto: bool,
        sel: SideSel,
    ) -> Result<(), ChannelError> {
        let sides: &[Side] = match sel {
            SideSel::In => &[Side::In],
            SideSel::Out => &[Side::Out],
            SideSel::Both => &[Side::In, Side::Out],
        };
        for &side in sides {
            if !reset_to_auto && !self.supports_manual_weight(id, side) {
                return Err(ChannelError::HostRejected(
                    "stepped slope takes no manual weight",
                ));
            }
            let key = self.key_mut(id);
            match side {
                Side::In => {
                    key.manual_weight_in = !reset_to_auto;
                    key.weight_in = if reset_to_auto { AUTO_WEIGHT } else { value };
                }
                Side::Out => {
                    key.manual_weight_out = !reset_to_auto;
                    key.weight_out = if reset_to_auto { AUTO_WEIGHT } else { value };
                }
            }
        }
        Ok(())
    }

    fn supports_manual_weight(&self, id: KeyId, side: Side) -> bool {
        !(self.reject_manual_weight && self.key(id).kind_on(side) == SlopeKind::Stepped)
    }

    fn delete(&mut self, id: KeyId) {
        let at = self.pos(id);
        self.keys.remove(at);
    }
}

#[derive(Clone, Debug)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Opaque,
}

#[derive(Clone, Debug)]
struct ChannelRec {
    name: String,
    kind: StorageKind,
    value: Scalar,
    curve: Option<MemoryCurve>,
}

impl ChannelRec {
    fn new(name: &str, kind: StorageKind) -> Self {
        let value = if kind.is_integer() {
            Scalar::Int(0)
        } else if kind.is_float() {
            Scalar::Float(0.0)
        } else if kind.is_textual() {
            Scalar::Text(String::new())
        } else {
            Scalar::Opaque
        };
        Self {
            name: name.to_string(),
            kind,
            value,
            curve: None,
        }
    }
}

/// In-memory scene of objects with named channels, plus a link table.
#[derive(Default)]
pub struct MemoryScene {
    time: f64,
    next_object: u32,
    objects: HashMap<ObjectId, Vec<ChannelRec>>,
    links: Vec<(ChannelRef, ChannelRef)>,
}

pub fn scene() -> MemoryScene {
    MemoryScene::new()
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn add_object(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        self.objects.insert(id, Vec::new());
        id
    }

    fn push_channel(&mut self, object: ObjectId, name: &str, kind: StorageKind) -> ChannelRef {
        let channels = self
            .objects
            .get_mut(&object)
            .expect("unknown object in fixture setup");
        channels.push(ChannelRec::new(name, kind));
        ChannelRef::new(object, (channels.len() - 1) as u32)
    }

    pub fn add_float_channel(&mut self, object: ObjectId, name: &str, value: f64) -> ChannelRef {
        let ch = self.push_channel(object, name, StorageKind::Float);
        self.rec_mut_infallible(ch).value = Scalar::Float(value);
        ch
    }

    pub fn add_int_channel(&mut self, object: ObjectId, name: &str, value: i64) -> ChannelRef {
        let ch = self.push_channel(object, name, StorageKind::Integer);
        self.rec_mut_infallible(ch).value = Scalar::Int(value);
        ch
    }

    pub fn add_text_channel(&mut self, object: ObjectId, name: &str, value: &str) -> ChannelRef {
        let ch = self.push_channel(object, name, StorageKind::String);
        self.rec_mut_infallible(ch).value = Scalar::Text(value.to_string());
        ch
    }

    pub fn add_channel_of_kind(
        &mut self,
        object: ObjectId,
        name: &str,
        kind: StorageKind,
    ) -> ChannelRef {
        self.push_channel(object, name, kind)
    }

    /// Bind an empty curve, returning the channel for chaining.
    pub fn bind_curve(&mut self, ch: ChannelRef) -> ChannelRef {
        let is_int = self.rec_mut_infallible(ch).kind.is_integer();
        self.rec_mut_infallible(ch).curve = Some(MemoryCurve::new(is_int));
        ch
    }

    /// Direct fixture access for assertions the `Curve` trait cannot express.
    pub fn memory_curve(&self, ch: ChannelRef) -> Option<&MemoryCurve> {
        self.rec(ch).ok()?.curve.as_ref()
    }

    pub fn memory_curve_mut(&mut self, ch: ChannelRef) -> Option<&mut MemoryCurve> {
        self.rec_mut(ch).ok()?.curve.as_mut()
    }

    fn rec(&self, ch: ChannelRef) -> Result<&ChannelRec, ChannelError> {
        self.objects
            .get(&ch.object)
            .and_then(|chs| chs.get(ch.index as usize))
            .ok_or_else(|| ChannelError::ChannelNotFound(ch.ident()))
    }

    fn rec_mut(&mut self, ch: ChannelRef) -> Result<&mut ChannelRec, ChannelError> {
        self.objects
            .get_mut(&ch.object)
            .and_then(|chs| chs.get_mut(ch.index as usize))
            .ok_or_else(|| ChannelError::ChannelNotFound(ch.ident()))
    }

    fn rec_mut_infallible(&mut self, ch: ChannelRef) -> &mut ChannelRec {
        self.rec_mut(ch).expect("channel created by this fixture")
    }
}

impl ChannelSource for MemoryScene {
    fn time(&self) -> f64 {
        self.time
    }

    fn channel_count(&self, object: ObjectId) -> u32 {
        self.objects
            .get(&object)
            .map(|chs| chs.len() as u32)
            .unwrap_or(0)
    }

    fn channel_name(&self, ch: ChannelRef) -> Result<String, ChannelError> {
        Ok(self.rec(ch)?.name.clone())
    }

    fn lookup(&self, object: ObjectId, name: &str) -> Option<ChannelRef> {
        let channels = self.objects.get(&object)?;
        channels
            .iter()
            .position(|c| c.name == name)
            .map(|at| ChannelRef::new(object, at as u32))
    }

    fn storage_kind(&self, ch: ChannelRef) -> Result<StorageKind, ChannelError> {
        Ok(self.rec(ch)?.kind)
    }

    fn int(&self, ch: ChannelRef) -> Result<i64, ChannelError> {
        let rec = self.rec(ch)?;
        if let Some(curve) = rec.curve.as_ref().filter(|c| !c.is_empty()) {
            return Ok(curve.evaluate(self.time) as i64);
        }
        match &rec.value {
            Scalar::Int(v) => Ok(*v),
            _ => Err(ChannelError::TypeMismatch(rec.kind)),
        }
    }

    fn float(&self, ch: ChannelRef) -> Result<f64, ChannelError> {
        let rec = self.rec(ch)?;
        if let Some(curve) = rec.curve.as_ref().filter(|c| !c.is_empty()) {
            return Ok(curve.evaluate(self.time));
        }
        match &rec.value {
            Scalar::Float(v) => Ok(*v),
            _ => Err(ChannelError::TypeMismatch(rec.kind)),
        }
    }

    fn text(&self, ch: ChannelRef) -> Result<String, ChannelError> {
        let rec = self.rec(ch)?;
        match &rec.value {
            Scalar::Text(s) => Ok(s.clone()),
            _ => Err(ChannelError::TypeMismatch(rec.kind)),
        }
    }

    fn curve(&self, ch: ChannelRef) -> Option<&dyn Curve> {
        self.rec(ch).ok()?.curve.as_ref().map(|c| c as &dyn Curve)
    }
}

impl ChannelSink for MemoryScene {
    fn set_int(&mut self, ch: ChannelRef, value: i64) -> Result<(), ChannelError> {
        let rec = self.rec_mut(ch)?;
        if !rec.kind.is_integer() {
            return Err(ChannelError::TypeMismatch(rec.kind));
        }
        rec.value = Scalar::Int(value);
        Ok(())
    }

    fn set_float(&mut self, ch: ChannelRef, value: f64) -> Result<(), ChannelError> {
        let rec = self.rec_mut(ch)?;
        if !rec.kind.is_float() {
            return Err(ChannelError::TypeMismatch(rec.kind));
        }
        rec.value = Scalar::Float(value);
        Ok(())
    }

    fn set_text(&mut self, ch: ChannelRef, value: &str) -> Result<(), ChannelError> {
        let rec = self.rec_mut(ch)?;
        if !rec.kind.is_textual() {
            return Err(ChannelError::TypeMismatch(rec.kind));
        }
        rec.value = Scalar::Text(value.to_string());
        Ok(())
    }

    fn set_int_key(
        &mut self,
        ch: ChannelRef,
        value: i64,
        force: bool,
    ) -> Result<(), ChannelError> {
        let time = self.time;
        if self.rec(ch)?.curve.is_none() {
            if !force {
                return self.set_int(ch, value);
            }
            self.rec_mut(ch)?.curve = Some(MemoryCurve::new(true));
        }
        if let Some(curve) = self.rec_mut(ch)?.curve.as_mut() {
            curve.add_int(time, value);
        }
        Ok(())
    }

    fn set_float_key(
        &mut self,
        ch: ChannelRef,
        value: f64,
        force: bool,
    ) -> Result<(), ChannelError> {
        let time = self.time;
        if self.rec(ch)?.curve.is_none() {
            if !force {
                return self.set_float(ch, value);
            }
            self.rec_mut(ch)?.curve = Some(MemoryCurve::new(false));
        }
        if let Some(curve) = self.rec_mut(ch)?.curve.as_mut() {
            curve.add_float(time, value);
        }
        Ok(())
    }

    fn curve_mut(&mut self, ch: ChannelRef) -> Option<&mut dyn Curve> {
        self.rec_mut(ch)
            .ok()?
            .curve
            .as_mut()
            .map(|c| c as &mut dyn Curve)
    }

    fn create_curve(&mut self, ch: ChannelRef) -> Result<&mut dyn Curve, ChannelError> {
        let rec = self.rec_mut(ch)?;
        if !rec.kind.can_carry_curve() || rec.kind.is_textual() {
            return Err(ChannelError::HostRejected("channel kind takes no curve"));
        }
        if rec.curve.is_none() {
            rec.curve = Some(MemoryCurve::new(rec.kind.is_integer()));
        }
        match rec.curve.as_mut() {
            Some(curve) => Ok(curve as &mut dyn Curve),
            None => Err(ChannelError::CurveNotBound(ch.ident())),
        }
    }

    fn add_channel(
        &mut self,
        object: ObjectId,
        name: &str,
        kind: StorageKind,
    ) -> Result<ChannelRef, ChannelError> {
        if !self.objects.contains_key(&object) {
            return Err(ChannelError::InvalidArgument(format!(
                "no object {object:?} in scene"
            )));
        }
        Ok(self.push_channel(object, name, kind))
    }
}

impl LinkGraph for MemoryScene {
    fn add_link(&mut self, from: ChannelRef, to: ChannelRef) -> Result<(), ChannelError> {
        self.rec(from)?;
        self.rec(to)?;
        // an already-present link is a success, not a refusal
        if !self.links.contains(&(from, to)) {
            self.links.push((from, to));
        }
        Ok(())
    }

    fn remove_link(&mut self, from: ChannelRef, to: ChannelRef) -> Result<(), ChannelError> {
        match self.links.iter().position(|l| *l == (from, to)) {
            Some(at) => {
                self.links.remove(at);
                Ok(())
            }
            None => Err(ChannelError::HostRejected("link not present")),
        }
    }

    fn forward_links(&self, from: ChannelRef) -> Vec<ChannelRef> {
        self.links
            .iter()
            .filter(|(f, _)| *f == from)
            .map(|(_, t)| *t)
            .collect()
    }
}
