//! First-run defaults. When a catalog key has never been written the
//! application starts from this data instead of an empty screen; referrals,
//! transactions and settings start empty/default.

use uuid::Uuid;

use crate::models::enums::{HazardClass, PaymentMethod};
use crate::models::{Company, ExamDefinition, MedicalInstitution};

/// Exam catalog, partner institutions and the predefined client companies.
/// Built together so company default-exam ids and forced-institution ids
/// reference the freshly generated catalog rows.
pub struct SeedData {
    pub exams: Vec<ExamDefinition>,
    pub institutions: Vec<MedicalInstitution>,
    pub companies: Vec<Company>,
}

pub fn initial_data() -> SeedData {
    let exams = vec![
        ExamDefinition::new("101", "Odyometri", 150.0, 70.0),
        ExamDefinition::new("102", "Akciğer Grafisi", 200.0, 100.0),
        ExamDefinition::new("103", "Hemogram", 100.0, 40.0),
        ExamDefinition::new("104", "Göz Muayenesi", 120.0, 50.0),
        ExamDefinition::new("105", "EKG", 150.0, 60.0),
        ExamDefinition::new("106", "Tetanoz Aşısı", 50.0, 15.0),
        ExamDefinition::new("107", "Açlık Kan Şekeri", 40.0, 10.0),
        ExamDefinition::new("108", "Karaciğer Fonksiyon Testleri", 180.0, 80.0),
    ];

    let institutions = vec![
        MedicalInstitution::new("Merkez OSGB Laboratuvarı", Some("0212 555 10 10")),
        MedicalInstitution::new("Yaşam Görüntüleme Merkezi", Some("0212 555 20 20")),
        MedicalInstitution::new("Devlet Hastanesi (Raporlu)", Some("182")),
    ];

    let exam_ids = |codes: &[&str]| -> Vec<Uuid> {
        codes
            .iter()
            .filter_map(|code| exams.iter().find(|e| e.code == *code).map(|e| e.id))
            .collect()
    };

    let companies = vec![
        Company {
            id: Uuid::new_v4(),
            name: "Mega Metal Sanayi A.Ş.".to_string(),
            hazard_class: HazardClass::VeryDangerous,
            assigned_doctor: "Dr. Mehmet Özdemir".to_string(),
            assigned_specialist: "Uzm. Ayşe Yılmaz (A Sınıfı)".to_string(),
            default_exams: exam_ids(&["102", "101", "103", "106", "108"]),
            default_payment_method: PaymentMethod::Invoice,
            // Contractually bound to the imaging center
            forced_institution_id: Some(institutions[1].id),
        },
        Company {
            id: Uuid::new_v4(),
            name: "TeknoSoft Yazılım Ltd.".to_string(),
            hazard_class: HazardClass::Less,
            assigned_doctor: "Dr. Zeynep Kaya".to_string(),
            assigned_specialist: "Uzm. Ali Veli (C Sınıfı)".to_string(),
            default_exams: exam_ids(&["104", "105"]),
            default_payment_method: PaymentMethod::Invoice,
            forced_institution_id: None,
        },
        Company {
            id: Uuid::new_v4(),
            name: "Kuzey Lojistik ve Depolama".to_string(),
            hazard_class: HazardClass::Dangerous,
            assigned_doctor: "Dr. Ahmet Demir".to_string(),
            assigned_specialist: "Uzm. Fatma Şahin (B Sınıfı)".to_string(),
            default_exams: exam_ids(&["103", "105", "107", "102"]),
            default_payment_method: PaymentMethod::Cash,
            forced_institution_id: None,
        },
        Company {
            id: Uuid::new_v4(),
            name: "Anadolu İnşaat Yapı".to_string(),
            hazard_class: HazardClass::VeryDangerous,
            assigned_doctor: "Dr. Mehmet Özdemir".to_string(),
            assigned_specialist: "Uzm. Burak Çelik (A Sınıfı)".to_string(),
            default_exams: exam_ids(&["106", "102", "101", "104", "105"]),
            default_payment_method: PaymentMethod::Cash,
            forced_institution_id: None,
        },
    ];

    SeedData {
        exams,
        institutions,
        companies,
    }
}
